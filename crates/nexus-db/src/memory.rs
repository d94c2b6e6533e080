//! In-memory repository implementations
//!
//! Enforce the same uniqueness constraints as the PostgreSQL schema, so the
//! retry paths in the service layer behave identically against either backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{AccountRow, SubscriptionHistoryRow};
use crate::repo::{
    AccountRepository, CreateAccount, CreateHistoryEntry, Page, SubscriptionHistoryRepository,
    EMAIL_CONSTRAINT, REFERRAL_CODE_CONSTRAINT,
};

/// In-memory account repository
#[derive(Default, Clone)]
pub struct InMemoryAccountRepository {
    accounts: Arc<DashMap<Uuid, AccountRow>>,
    by_referral_code: Arc<DashMap<String, Uuid>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, replacing any row with the same ID
    pub fn insert(&self, account: AccountRow) {
        self.by_referral_code
            .insert(account.user_referral_code.clone(), account.id);
        self.by_email.insert(account.email.clone(), account.id);
        self.accounts.insert(account.id, account);
    }

    /// Snapshot of a stored row
    pub fn get(&self, id: Uuid) -> Option<AccountRow> {
        self.accounts.get(&id).map(|r| r.value().clone())
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        Ok(self.get(id))
    }

    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>> {
        Ok(self
            .by_referral_code
            .get(code)
            .and_then(|id| self.accounts.get(id.value()).map(|r| r.value().clone())))
    }

    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        let mut lapsed: Vec<AccountRow> = self
            .accounts
            .iter()
            .filter(|r| r.value().is_lapsed_at(now))
            .map(|r| r.value().clone())
            .collect();

        lapsed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(lapsed
            .into_iter()
            .skip(usize::try_from(page.offset).unwrap_or(0))
            .take(usize::try_from(page.limit).unwrap_or(0))
            .collect())
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        // Lock order: email, then referral code
        let email_slot = match self.by_email.entry(account.email.clone()) {
            Entry::Occupied(_) => return Err(DbError::UniqueViolation(EMAIL_CONSTRAINT.into())),
            Entry::Vacant(slot) => slot,
        };
        let code_slot = match self.by_referral_code.entry(account.user_referral_code.clone()) {
            Entry::Occupied(_) => {
                return Err(DbError::UniqueViolation(REFERRAL_CODE_CONSTRAINT.into()))
            }
            Entry::Vacant(slot) => slot,
        };

        let now = Utc::now();
        let row = AccountRow {
            id: account.id,
            email: account.email,
            class_status: account.class_status,
            role: account.role,
            subscription_tier: account.subscription_tier,
            subscription_expiry_date: account.subscription_expiry_date,
            user_referral_code: account.user_referral_code,
            referral_stats: account.referral_stats,
            total_points: account.total_points,
            created_at: now,
            updated_at: now,
        };

        code_slot.insert(row.id);
        email_slot.insert(row.id);
        self.accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        let mut account = self.accounts.get_mut(&id).ok_or(DbError::NotFound)?;
        account.subscription_tier = tier.to_string();
        account.subscription_expiry_date = expiry;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// In-memory subscription history repository
#[derive(Default, Clone)]
pub struct InMemoryHistoryRepository {
    entries: Arc<DashMap<Uuid, SubscriptionHistoryRow>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored entry, oldest first
    pub fn all(&self) -> Vec<SubscriptionHistoryRow> {
        let mut rows: Vec<_> = self.entries.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|row| row.created_at);
        rows
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SubscriptionHistoryRepository for InMemoryHistoryRepository {
    async fn create(&self, entry: CreateHistoryEntry) -> DbResult<SubscriptionHistoryRow> {
        let row = SubscriptionHistoryRow {
            id: entry.id,
            account_id: entry.account_id,
            tier: entry.tier,
            start_date: entry.start_date,
            end_date: entry.end_date,
            status: entry.status,
            notes: entry.notes,
            created_at: Utc::now(),
        };
        self.entries.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_account_id(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<SubscriptionHistoryRow>> {
        let mut rows: Vec<_> = self
            .entries
            .iter()
            .filter(|r| r.value().account_id == account_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_input(email: &str, code: &str) -> CreateAccount {
        CreateAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            class_status: Some("12th".to_string()),
            role: "user".to_string(),
            subscription_tier: "free".to_string(),
            subscription_expiry_date: Utc::now() + Duration::days(365),
            user_referral_code: code.to_string(),
            referral_stats: serde_json::json!({}),
            total_points: 0,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_referral_code() {
        let repo = InMemoryAccountRepository::new();
        repo.create(create_input("a@example.com", "NEXUS-AAAAAA"))
            .await
            .unwrap();

        let err = repo
            .create(create_input("b@example.com", "NEXUS-AAAAAA"))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on(REFERRAL_CODE_CONSTRAINT));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = InMemoryAccountRepository::new();
        repo.create(create_input("a@example.com", "NEXUS-AAAAAA"))
            .await
            .unwrap();

        let err = repo
            .create(create_input("a@example.com", "NEXUS-BBBBBB"))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on(EMAIL_CONSTRAINT));
        // The rejected code must stay free for the next caller
        assert!(repo.find_by_referral_code("NEXUS-BBBBBB").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_lapsed_filters_and_orders() {
        let repo = InMemoryAccountRepository::new();
        let now = Utc::now();

        let mut older = repo
            .create(create_input("old@example.com", "NEXUS-000001"))
            .await
            .unwrap();
        older.subscription_tier = "dpp".to_string();
        older.subscription_expiry_date = now - Duration::days(1);
        older.created_at = now - Duration::days(30);
        repo.insert(older.clone());

        let mut newer = repo
            .create(create_input("new@example.com", "NEXUS-000002"))
            .await
            .unwrap();
        newer.subscription_tier = "combo".to_string();
        newer.subscription_expiry_date = now - Duration::hours(1);
        newer.created_at = now - Duration::days(2);
        repo.insert(newer.clone());

        let mut free = repo
            .create(create_input("free@example.com", "NEXUS-000003"))
            .await
            .unwrap();
        free.subscription_expiry_date = now - Duration::days(1);
        repo.insert(free);

        let lapsed = repo.find_lapsed(now, Page::first(10)).await.unwrap();
        let ids: Vec<_> = lapsed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let second_page = repo
            .find_lapsed(now, Page { limit: 1, offset: 1 })
            .await
            .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, older.id);
    }

    #[tokio::test]
    async fn test_update_entitlement_missing_account() {
        let repo = InMemoryAccountRepository::new();
        let err = repo
            .update_entitlement(Uuid::new_v4(), "free", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
