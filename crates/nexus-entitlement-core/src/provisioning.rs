//! Account provisioning
//!
//! Fills in every entitlement field of a newly submitted account before its
//! first save: free tier with the long-horizon expiry, role from class status,
//! a fresh referral code, zeroed referral counters and points.

use chrono::{DateTime, Utc};
use nexus_db::{AccountRepository, CreateAccount};
use nexus_types::{referral_stats_populated, zeroed_referral_stats, ReferralCode, Role, Tier};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::EntitlementConfig;
use crate::referral::ReferralCodeGenerator;
use crate::EntitlementError;

/// Account as submitted by the sign-up flow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountDraft {
    pub email: String,
    #[serde(default)]
    pub class_status: Option<String>,
    #[serde(default)]
    pub referral_stats: Option<Value>,
    #[serde(default)]
    pub total_points: Option<i64>,
}

/// Applies default entitlement state to new accounts
#[derive(Debug, Clone)]
pub struct AccountProvisioner {
    config: EntitlementConfig,
    referral: ReferralCodeGenerator,
}

impl AccountProvisioner {
    /// Create a provisioner
    pub fn new(config: EntitlementConfig) -> Self {
        Self {
            referral: ReferralCodeGenerator::new(&config),
            config,
        }
    }

    /// Referral code generator used for new accounts
    pub fn referral(&self) -> &ReferralCodeGenerator {
        &self.referral
    }

    /// Provision a draft into a ready-to-insert account.
    ///
    /// Any failure (code space exhausted, lookup error) is wrapped in
    /// [`EntitlementError::Provisioning`]; nothing is written to the store.
    pub async fn provision(
        &self,
        draft: &AccountDraft,
        accounts: &dyn AccountRepository,
        now: DateTime<Utc>,
    ) -> Result<CreateAccount, EntitlementError> {
        let code = self
            .referral
            .generate(accounts)
            .await
            .map_err(EntitlementError::provisioning)?;

        Ok(self.apply_defaults(draft, code, now))
    }

    /// Apply the entitlement defaults with an already-chosen referral code
    pub fn apply_defaults(
        &self,
        draft: &AccountDraft,
        referral_code: ReferralCode,
        now: DateTime<Utc>,
    ) -> CreateAccount {
        let role = Role::from_class_status(draft.class_status.as_deref());

        let referral_stats = match &draft.referral_stats {
            Some(stats) if referral_stats_populated(Some(stats)) => stats.clone(),
            _ => zeroed_referral_stats(),
        };

        CreateAccount {
            id: Uuid::new_v4(),
            email: draft.email.clone(),
            class_status: draft.class_status.clone(),
            role: role.to_string(),
            subscription_tier: Tier::Free.to_string(),
            subscription_expiry_date: self.config.free_tier_expiry(now),
            user_referral_code: referral_code.into_inner(),
            referral_stats,
            total_points: draft.total_points.unwrap_or(0),
        }
    }
}
