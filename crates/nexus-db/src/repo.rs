//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Name of the unique constraint on `accounts.user_referral_code`
pub const REFERRAL_CODE_CONSTRAINT: &str = "accounts_user_referral_code_key";

/// Name of the unique constraint on `accounts.email`
pub const EMAIL_CONSTRAINT: &str = "accounts_email_key";

/// Limit/offset window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// First page of the given size
    pub const fn first(limit: i64) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>>;

    /// Find an account by its referral code
    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>>;

    /// Find accounts on a paid tier whose expiry is strictly before `now`,
    /// newest-created first
    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>>;

    /// Create a new account.
    ///
    /// Fails with [`DbError::UniqueViolation`](crate::DbError::UniqueViolation)
    /// naming [`REFERRAL_CODE_CONSTRAINT`] when the referral code is taken.
    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow>;

    /// Set tier and expiry, bumping `updated_at`
    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow>;

    /// Check the backend is reachable
    async fn ping(&self) -> DbResult<()>;
}

/// Create account input
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub id: Uuid,
    pub email: String,
    pub class_status: Option<String>,
    pub role: String,
    pub subscription_tier: String,
    pub subscription_expiry_date: DateTime<Utc>,
    pub user_referral_code: String,
    pub referral_stats: serde_json::Value,
    pub total_points: i64,
}

/// Subscription history repository trait (append-only)
#[async_trait]
pub trait SubscriptionHistoryRepository: Send + Sync {
    /// Append a history entry
    async fn create(&self, entry: CreateHistoryEntry) -> DbResult<SubscriptionHistoryRow>;

    /// Find history entries for an account, newest first
    async fn find_by_account_id(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<SubscriptionHistoryRow>>;
}

/// Create history entry input
#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub tier: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: String,
}
