//! Subscription history recording

use chrono::{DateTime, SecondsFormat, Utc};
use nexus_db::{
    AccountRow, CreateHistoryEntry, DbError, DbResult, SubscriptionHistoryRepository,
    SubscriptionHistoryRow,
};
use nexus_types::{SubscriptionHistoryEntry, SubscriptionStatus, Tier};
use std::sync::Arc;
use uuid::Uuid;

/// Appends entitlement transitions to the history store
#[derive(Clone)]
pub struct HistoryRecorder {
    repo: Arc<dyn SubscriptionHistoryRepository>,
}

impl HistoryRecorder {
    /// Create a recorder over a history repository
    pub fn new(repo: Arc<dyn SubscriptionHistoryRepository>) -> Self {
        Self { repo }
    }

    /// Log that `account`'s paid tier lapsed and was replaced by `new_tier`.
    ///
    /// `account` is the row as read before the downgrade: its tier is the one
    /// logged and its `updated_at` becomes the entry's start date.
    pub async fn record_expiry(
        &self,
        account: &AccountRow,
        new_tier: &Tier,
        processed_at: DateTime<Utc>,
    ) -> DbResult<SubscriptionHistoryRow> {
        let old_tier = account.tier();
        let entry = CreateHistoryEntry {
            id: Uuid::new_v4(),
            account_id: account.id,
            tier: old_tier.to_string(),
            start_date: account.updated_at,
            end_date: Some(processed_at),
            status: SubscriptionStatus::Expired.to_string(),
            notes: expiry_note(
                &old_tier,
                new_tier,
                account.subscription_expiry_date,
                processed_at,
            ),
        };

        self.repo.create(entry).await
    }

    /// History for an account, newest first
    pub async fn list(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<SubscriptionHistoryEntry>> {
        self.repo
            .find_by_account_id(account_id, limit)
            .await?
            .into_iter()
            .map(|row| row.into_entry().map_err(DbError::from))
            .collect()
    }
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder").finish_non_exhaustive()
    }
}

/// Human-readable note for an automatic downgrade
pub fn expiry_note(
    old_tier: &Tier,
    new_tier: &Tier,
    original_expiry: DateTime<Utc>,
    processed_at: DateTime<Utc>,
) -> String {
    format!(
        "Automatically downgraded from {old_tier} to {new_tier} tier after expiry on {}. Processed on {}.",
        original_expiry.to_rfc3339_opts(SecondsFormat::Millis, true),
        processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expiry_note_mentions_both_tiers_and_dates() {
        let expiry = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let processed = Utc.with_ymd_and_hms(2026, 3, 2, 4, 0, 0).unwrap();

        let note = expiry_note(&Tier::Combo, &Tier::Free, expiry, processed);

        assert_eq!(
            note,
            "Automatically downgraded from combo to free tier after expiry on \
             2026-03-01T00:00:00.000Z. Processed on 2026-03-02T04:00:00.000Z."
        );
    }
}
