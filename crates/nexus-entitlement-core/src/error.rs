//! Entitlement errors

use nexus_db::DbError;
use nexus_types::AccountId;
use thiserror::Error;

/// Entitlement errors
#[derive(Error, Debug)]
pub enum EntitlementError {
    /// Submitted account is missing a required field
    #[error("validation failed: {0}")]
    Validation(String),

    /// Account not found
    #[error("account not found")]
    AccountNotFound,

    /// An account with the same email already exists
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// Every referral code drawn was already taken
    #[error("referral code space exhausted after {attempts} attempts")]
    CodeSpaceExhausted {
        /// Draws made before giving up
        attempts: u32,
    },

    /// Defaulting a new account failed; nothing was persisted
    #[error("account provisioning failed: {0}")]
    Provisioning(#[source] Box<EntitlementError>),

    /// A store write failed mid-batch; earlier accounts stay downgraded
    #[error("reconciliation aborted after {processed} accounts: {source}")]
    ReconciliationAborted {
        /// Accounts fully processed before the failure
        processed: usize,
        /// Account being processed when the failure happened, if any
        account_id: Option<AccountId>,
        /// Underlying store error
        #[source]
        source: DbError,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl EntitlementError {
    /// Wrap an error raised while defaulting a new account
    pub fn provisioning(err: EntitlementError) -> Self {
        match err {
            already @ Self::Provisioning(_) => already,
            other => Self::Provisioning(Box::new(other)),
        }
    }

    /// Check if this is a client-side error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::AccountExists(_) | Self::AccountNotFound
        )
    }

    /// Check if the referral code space was exhausted, directly or during provisioning
    pub fn is_code_space_exhausted(&self) -> bool {
        match self {
            Self::CodeSpaceExhausted { .. } => true,
            Self::Provisioning(inner) => inner.is_code_space_exhausted(),
            _ => false,
        }
    }
}
