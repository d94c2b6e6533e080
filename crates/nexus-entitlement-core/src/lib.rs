//! Nexus Entitlement Core - Subscription lifecycle business logic
//!
//! Account provisioning, referral code generation, subscription history and
//! the expiry reconciliation job.
//!
//! # Example
//!
//! ```rust,ignore
//! use nexus_entitlement_core::{AccountDraft, EntitlementConfig, EntitlementService};
//!
//! let config = EntitlementConfig::new().with_referral_prefix("NEXUS");
//! let service = EntitlementService::new(config, accounts, history);
//!
//! // Sign-up
//! let account = service.create_account(draft).await?;
//!
//! // Cron-triggered reconciliation
//! let report = service.reconcile_expiries().await?;
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod provisioning;
pub mod reconcile;
pub mod referral;
pub mod service;

pub use config::EntitlementConfig;
pub use error::EntitlementError;
pub use history::HistoryRecorder;
pub use provisioning::{AccountDraft, AccountProvisioner};
pub use reconcile::{DowngradedAccount, ExpiryReconciler, ReconciliationReport};
pub use referral::ReferralCodeGenerator;
pub use service::EntitlementService;
