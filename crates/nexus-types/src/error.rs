//! Common error types

use thiserror::Error;

/// Errors raised while parsing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NexusError {
    /// Unknown role name
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Unknown subscription status
    #[error("invalid subscription status: {0}")]
    InvalidStatus(String),

    /// Referral code does not match `PREFIX-XXXXXX`
    #[error("invalid referral code: {0}")]
    InvalidReferralCode(String),
}
