//! Entitlement service - ties together provisioning, history and reconciliation

use chrono::Utc;
use nexus_db::{
    AccountRepository, AccountRow, SubscriptionHistoryRepository, EMAIL_CONSTRAINT,
    REFERRAL_CODE_CONSTRAINT,
};
use nexus_types::{AccountId, SubscriptionHistoryEntry};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::EntitlementConfig;
use crate::history::HistoryRecorder;
use crate::provisioning::{AccountDraft, AccountProvisioner};
use crate::reconcile::{ExpiryReconciler, ReconciliationReport};
use crate::EntitlementError;

/// Entitlement service
///
/// Provides a unified interface for:
/// - Account creation with entitlement defaults
/// - Subscription history lookups
/// - Expiry reconciliation
pub struct EntitlementService {
    config: EntitlementConfig,
    accounts: Arc<dyn AccountRepository>,
    provisioner: AccountProvisioner,
    history: HistoryRecorder,
    reconciler: ExpiryReconciler,
}

impl EntitlementService {
    /// Create a new entitlement service
    pub fn new(
        config: EntitlementConfig,
        accounts: Arc<dyn AccountRepository>,
        history_repo: Arc<dyn SubscriptionHistoryRepository>,
    ) -> Self {
        let history = HistoryRecorder::new(history_repo);

        Self {
            provisioner: AccountProvisioner::new(config.clone()),
            reconciler: ExpiryReconciler::new(config.clone(), Arc::clone(&accounts), history.clone()),
            history,
            accounts,
            config,
        }
    }

    /// Service configuration
    pub fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Provision and persist a new account.
    ///
    /// When the store rejects the referral code as taken (a concurrent sign-up
    /// won the race), provisioning is repeated with a fresh code, up to the
    /// referral attempt cap.
    #[instrument(skip(self, draft), fields(email = %draft.email))]
    pub async fn create_account(&self, draft: AccountDraft) -> Result<AccountRow, EntitlementError> {
        validate_draft(&draft)?;

        let max_attempts = self.provisioner.referral().max_attempts();
        for attempt in 1..=max_attempts {
            let account = self
                .provisioner
                .provision(&draft, self.accounts.as_ref(), Utc::now())
                .await?;

            match self.accounts.create(account).await {
                Ok(row) => {
                    info!(
                        account_id = %row.id,
                        role = %row.role,
                        referral_code = %row.user_referral_code,
                        "Account created"
                    );
                    return Ok(row);
                }
                Err(e) if e.is_unique_violation_on(REFERRAL_CODE_CONSTRAINT) => {
                    warn!(attempt, "Referral code taken at insert, reprovisioning");
                }
                Err(e) if e.is_unique_violation_on(EMAIL_CONSTRAINT) => {
                    return Err(EntitlementError::AccountExists(draft.email));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(EntitlementError::provisioning(
            EntitlementError::CodeSpaceExhausted {
                attempts: max_attempts,
            },
        ))
    }

    /// Look up an account
    pub async fn get_account(&self, id: &AccountId) -> Result<AccountRow, EntitlementError> {
        self.accounts
            .find_by_id(id.0)
            .await?
            .ok_or(EntitlementError::AccountNotFound)
    }

    /// Subscription history for an account, newest first
    pub async fn subscription_history(
        &self,
        id: &AccountId,
        limit: i64,
    ) -> Result<Vec<SubscriptionHistoryEntry>, EntitlementError> {
        Ok(self.history.list(id.0, limit).await?)
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Downgrade every lapsed paid account
    pub async fn reconcile_expiries(&self) -> Result<ReconciliationReport, EntitlementError> {
        self.reconciler.run().await
    }

    /// Reconciler, for callers that need to pin the comparison time
    pub fn reconciler(&self) -> &ExpiryReconciler {
        &self.reconciler
    }

    /// Check the account store is reachable
    pub async fn ping(&self) -> Result<(), EntitlementError> {
        Ok(self.accounts.ping().await?)
    }
}

impl std::fmt::Debug for EntitlementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_draft(draft: &AccountDraft) -> Result<(), EntitlementError> {
    if draft.email.trim().is_empty() {
        return Err(EntitlementError::Validation("email is required".into()));
    }
    Ok(())
}
