//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use nexus_types::{
    AccountId, HistoryEntryId, NexusError, Role, SubscriptionHistoryEntry, SubscriptionStatus, Tier,
};

/// Account row from the database
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub class_status: Option<String>,
    pub role: String,
    pub subscription_tier: String,
    pub subscription_expiry_date: DateTime<Utc>,
    pub user_referral_code: String,
    pub referral_stats: serde_json::Value,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription history row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionHistoryRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub tier: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

// Conversion helpers from row types to nexus-types domain types
impl AccountRow {
    /// Convert to domain AccountId
    pub fn account_id(&self) -> AccountId {
        AccountId(self.id)
    }

    /// Current subscription tier
    pub fn tier(&self) -> Tier {
        Tier::from(self.subscription_tier.as_str())
    }

    /// Stored role, falling back to a plain user for unknown values
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    /// Whether the paid entitlement has lapsed at `now`
    pub fn is_lapsed_at(&self, now: DateTime<Utc>) -> bool {
        self.tier().is_paid() && self.subscription_expiry_date < now
    }
}

impl SubscriptionHistoryRow {
    /// Convert to domain AccountId
    pub fn account_id(&self) -> AccountId {
        AccountId(self.account_id)
    }

    /// Convert to the domain history entry, rejecting unknown statuses
    pub fn into_entry(self) -> Result<SubscriptionHistoryEntry, NexusError> {
        let status: SubscriptionStatus = self.status.parse()?;

        Ok(SubscriptionHistoryEntry {
            id: HistoryEntryId(self.id),
            account_id: self.account_id(),
            tier: Tier::from(self.tier),
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}
