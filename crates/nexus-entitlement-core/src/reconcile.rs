//! Expiry reconciliation
//!
//! Downgrades every account whose paid entitlement lapsed and logs the
//! transition. Accounts are processed one at a time with no batch-wide
//! transaction: the first store failure stops the run, earlier accounts stay
//! downgraded, and the next run picks up whatever is still lapsed.

use chrono::{DateTime, Utc};
use nexus_db::{AccountRepository, AccountRow, DbResult, Page};
use nexus_types::{AccountId, Tier};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::EntitlementConfig;
use crate::history::HistoryRecorder;
use crate::EntitlementError;

/// One downgraded account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DowngradedAccount {
    pub account_id: AccountId,
    pub old_tier: Tier,
    pub new_tier: Tier,
}

/// Outcome of a reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    /// Timestamp every expiry was compared against
    pub processed_at: DateTime<Utc>,
    /// Number of accounts downgraded
    pub processed_count: usize,
    /// Downgraded accounts in processing order
    pub downgraded: Vec<DowngradedAccount>,
}

impl ReconciliationReport {
    fn new(processed_at: DateTime<Utc>) -> Self {
        Self {
            processed_at,
            processed_count: 0,
            downgraded: Vec::new(),
        }
    }

    fn push(&mut self, account: DowngradedAccount) {
        self.processed_count += 1;
        self.downgraded.push(account);
    }
}

/// Finds lapsed paid accounts and moves them back to the free tier
#[derive(Clone)]
pub struct ExpiryReconciler {
    config: EntitlementConfig,
    accounts: Arc<dyn AccountRepository>,
    history: HistoryRecorder,
}

impl ExpiryReconciler {
    /// Create a reconciler
    pub fn new(
        config: EntitlementConfig,
        accounts: Arc<dyn AccountRepository>,
        history: HistoryRecorder,
    ) -> Self {
        Self {
            config,
            accounts,
            history,
        }
    }

    /// Reconcile against the current time
    pub async fn run(&self) -> Result<ReconciliationReport, EntitlementError> {
        self.run_at(Utc::now()).await
    }

    /// Reconcile every account whose paid expiry is strictly before `now`.
    ///
    /// Lapsed accounts are read in pages from offset zero: each downgrade
    /// removes the account from the filter, so the next read returns the
    /// remainder.
    #[instrument(skip(self), fields(now = %now))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<ReconciliationReport, EntitlementError> {
        let mut report = ReconciliationReport::new(now);
        let mut seen = HashSet::new();
        let batch_size = self.config.reconcile_batch_size;

        info!("Starting subscription expiry check");

        loop {
            let page = self
                .accounts
                .find_lapsed(now, Page::first(batch_size))
                .await
                .map_err(|source| EntitlementError::ReconciliationAborted {
                    processed: report.processed_count,
                    account_id: None,
                    source,
                })?;

            let page_len = page.len();
            let mut progressed = false;

            for account in page {
                if !seen.insert(account.id) {
                    continue;
                }
                progressed = true;

                let downgraded = self.downgrade(&account, now).await.map_err(|source| {
                    EntitlementError::ReconciliationAborted {
                        processed: report.processed_count,
                        account_id: Some(account.account_id()),
                        source,
                    }
                })?;
                report.push(downgraded);
            }

            if i64::try_from(page_len).unwrap_or(i64::MAX) < batch_size {
                break;
            }
            if !progressed {
                // Store keeps returning rows this run already downgraded
                warn!(page_len, "Lapsed scan made no progress, stopping");
                break;
            }
        }

        info!(
            processed_count = report.processed_count,
            "Subscription expiry check completed"
        );
        Ok(report)
    }

    /// Downgrade one account and log the transition
    async fn downgrade(&self, account: &AccountRow, now: DateTime<Utc>) -> DbResult<DowngradedAccount> {
        let old_tier = account.tier();
        let new_tier = Tier::Free;
        let new_expiry = self.config.free_tier_expiry(now);

        self.accounts
            .update_entitlement(account.id, new_tier.as_str(), new_expiry)
            .await?;
        self.history.record_expiry(account, &new_tier, now).await?;

        info!(
            account_id = %account.id,
            old_tier = %old_tier,
            old_expiry = %account.subscription_expiry_date,
            "Account downgraded to free tier"
        );

        Ok(DowngradedAccount {
            account_id: account.account_id(),
            old_tier,
            new_tier,
        })
    }
}

impl std::fmt::Debug for ExpiryReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryReconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
