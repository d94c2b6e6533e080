//! PostgreSQL subscription history repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SubscriptionHistoryRow;
use crate::repo::{CreateHistoryEntry, SubscriptionHistoryRepository};

/// PostgreSQL subscription history repository
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    /// Create a new history repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionHistoryRepository for PgHistoryRepository {
    async fn create(&self, entry: CreateHistoryEntry) -> DbResult<SubscriptionHistoryRow> {
        let row = sqlx::query_as::<_, SubscriptionHistoryRow>(
            r#"
            INSERT INTO subscription_history (id, account_id, tier, start_date, end_date,
                                              status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, account_id, tier, start_date, end_date, status, notes, created_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.account_id)
        .bind(&entry.tier)
        .bind(entry.start_date)
        .bind(entry.end_date)
        .bind(&entry.status)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_account_id(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<SubscriptionHistoryRow>> {
        let rows = sqlx::query_as::<_, SubscriptionHistoryRow>(
            r#"
            SELECT id, account_id, tier, start_date, end_date, status, notes, created_at
            FROM subscription_history
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
