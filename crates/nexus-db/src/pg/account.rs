//! PostgreSQL account repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::AccountRow;
use crate::repo::{AccountRepository, CreateAccount, Page};

/// PostgreSQL account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        let account = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, class_status, role, subscription_tier, subscription_expiry_date,
                   user_referral_code, referral_stats, total_points, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>> {
        let account = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, class_status, role, subscription_tier, subscription_expiry_date,
                   user_referral_code, referral_stats, total_points, created_at, updated_at
            FROM accounts
            WHERE user_referral_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        let accounts = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, class_status, role, subscription_tier, subscription_expiry_date,
                   user_referral_code, referral_stats, total_points, created_at, updated_at
            FROM accounts
            WHERE subscription_tier <> 'free' AND subscription_expiry_date < $1
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(now)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, class_status, role, subscription_tier,
                                  subscription_expiry_date, user_referral_code,
                                  referral_stats, total_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, email, class_status, role, subscription_tier, subscription_expiry_date,
                      user_referral_code, referral_stats, total_points, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.class_status)
        .bind(&account.role)
        .bind(&account.subscription_tier)
        .bind(account.subscription_expiry_date)
        .bind(&account.user_referral_code)
        .bind(&account.referral_stats)
        .bind(account.total_points)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        // RowNotFound maps to DbError::NotFound
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET subscription_tier = $1, subscription_expiry_date = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, email, class_status, role, subscription_tier, subscription_expiry_date,
                      user_referral_code, referral_stats, total_points, created_at, updated_at
            "#,
        )
        .bind(tier)
        .bind(expiry)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
