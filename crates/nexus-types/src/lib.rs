//! Nexus Types - Shared domain types
//!
//! This crate contains domain types used across Nexus services:
//! - Accounts, roles and referral codes
//! - Subscription tiers
//! - Subscription history statuses

pub mod account;
pub mod error;
pub mod referral;
pub mod subscription;
pub mod tier;

pub use account::*;
pub use error::*;
pub use referral::*;
pub use subscription::*;
pub use tier::*;
