//! Failure-injecting repository wrappers for testing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_db::{
    AccountRepository, AccountRow, CreateAccount, CreateHistoryEntry, DbError, DbResult,
    InMemoryAccountRepository, InMemoryHistoryRepository, Page, SubscriptionHistoryRepository,
    SubscriptionHistoryRow, REFERRAL_CODE_CONSTRAINT,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Build an account row with the given entitlement state
pub fn account_row(tier: &str, expiry: DateTime<Utc>, created_at: DateTime<Utc>) -> AccountRow {
    let id = Uuid::new_v4();
    AccountRow {
        id,
        email: format!("test-{id}@example.com"),
        class_status: Some("12th".to_string()),
        role: "user".to_string(),
        subscription_tier: tier.to_string(),
        subscription_expiry_date: expiry,
        user_referral_code: format!("TEST-{}", &id.simple().to_string()[..6].to_uppercase()),
        referral_stats: serde_json::json!({}),
        total_points: 0,
        created_at,
        updated_at: created_at,
    }
}

/// Account store that reports every referral code as already taken
#[derive(Default, Clone)]
pub struct TakenCodesRepository {
    inner: InMemoryAccountRepository,
    lookups: Arc<AtomicUsize>,
}

impl TakenCodesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of referral code lookups served
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of persisted accounts
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl AccountRepository for TakenCodesRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let mut holder = account_row("free", Utc::now(), Utc::now());
        holder.user_referral_code = code.to_string();
        Ok(Some(holder))
    }

    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        self.inner.find_lapsed(now, page).await
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        self.inner.create(account).await
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        self.inner.update_entitlement(id, tier, expiry).await
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// Account store whose pre-check always says "free" but whose insert rejects
/// the first `conflicts` referral codes, as if concurrent sign-ups won them
#[derive(Clone)]
pub struct RacingAccountRepository {
    inner: InMemoryAccountRepository,
    conflicts_left: Arc<AtomicUsize>,
    attempted_codes: Arc<Mutex<Vec<String>>>,
}

impl RacingAccountRepository {
    pub fn new(conflicts: usize) -> Self {
        Self {
            inner: InMemoryAccountRepository::new(),
            conflicts_left: Arc::new(AtomicUsize::new(conflicts)),
            attempted_codes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Referral codes offered to `create`, in order
    pub fn attempted_codes(&self) -> Vec<String> {
        self.attempted_codes.lock().unwrap().clone()
    }

    pub fn inner(&self) -> &InMemoryAccountRepository {
        &self.inner
    }
}

#[async_trait]
impl AccountRepository for RacingAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_referral_code(&self, _code: &str) -> DbResult<Option<AccountRow>> {
        Ok(None)
    }

    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        self.inner.find_lapsed(now, page).await
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        self.attempted_codes
            .lock()
            .unwrap()
            .push(account.user_referral_code.clone());

        let lost_race = self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lost_race {
            return Err(DbError::UniqueViolation(REFERRAL_CODE_CONSTRAINT.to_string()));
        }

        self.inner.create(account).await
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        self.inner.update_entitlement(id, tier, expiry).await
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// Account store that fails `update_entitlement` for one account while armed
#[derive(Clone)]
pub struct FlakyAccountRepository {
    inner: InMemoryAccountRepository,
    fail_on: Arc<Mutex<Option<Uuid>>>,
    writes: Arc<AtomicUsize>,
}

impl FlakyAccountRepository {
    pub fn new(inner: InMemoryAccountRepository) -> Self {
        Self {
            inner,
            fail_on: Arc::new(Mutex::new(None)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make updates to `id` fail until disarmed
    pub fn fail_updates_for(&self, id: Uuid) {
        *self.fail_on.lock().unwrap() = Some(id);
    }

    pub fn disarm(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountRepository for FlakyAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_referral_code(code).await
    }

    async fn find_lapsed(&self, now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        self.inner.find_lapsed(now, page).await
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        let row = self.inner.create(account).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        let armed = *self.fail_on.lock().unwrap() == Some(id);
        if armed {
            return Err(DbError::Unavailable("injected write failure".to_string()));
        }
        let row = self.inner.update_entitlement(id, tier, expiry).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// History store that rejects every append while armed
#[derive(Clone, Default)]
pub struct FlakyHistoryRepository {
    inner: InMemoryHistoryRepository,
    failing: Arc<AtomicBool>,
}

impl FlakyHistoryRepository {
    pub fn new(inner: InMemoryHistoryRepository) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionHistoryRepository for FlakyHistoryRepository {
    async fn create(&self, entry: CreateHistoryEntry) -> DbResult<SubscriptionHistoryRow> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("injected append failure".to_string()));
        }
        self.inner.create(entry).await
    }

    async fn find_by_account_id(
        &self,
        account_id: Uuid,
        limit: i64,
    ) -> DbResult<Vec<SubscriptionHistoryRow>> {
        self.inner.find_by_account_id(account_id, limit).await
    }
}

/// Account store whose lapsed query keeps returning the same rows, as if
/// downgrades never became visible to it
#[derive(Clone)]
pub struct StuckLapsedRepository {
    inner: InMemoryAccountRepository,
    stuck: Vec<AccountRow>,
    scans: Arc<AtomicUsize>,
}

impl StuckLapsedRepository {
    pub fn new(inner: InMemoryAccountRepository, stuck: Vec<AccountRow>) -> Self {
        Self {
            inner,
            stuck,
            scans: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of lapsed queries served
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountRepository for StuckLapsedRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_referral_code(&self, code: &str) -> DbResult<Option<AccountRow>> {
        self.inner.find_by_referral_code(code).await
    }

    async fn find_lapsed(&self, _now: DateTime<Utc>, page: Page) -> DbResult<Vec<AccountRow>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .stuck
            .iter()
            .take(usize::try_from(page.limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        self.inner.create(account).await
    }

    async fn update_entitlement(
        &self,
        id: Uuid,
        tier: &str,
        expiry: DateTime<Utc>,
    ) -> DbResult<AccountRow> {
        self.inner.update_entitlement(id, tier, expiry).await
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
