//! Subscription history types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountId, NexusError, Tier};

/// Unique history entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntryId(pub Uuid);

/// Status recorded on a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Entitlement is running
    Active,
    /// Entitlement lapsed and the account was downgraded
    Expired,
    /// Entitlement was canceled before its expiry
    Canceled,
}

impl SubscriptionStatus {
    /// Storage name of the status
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "canceled" => Ok(Self::Canceled),
            _ => Err(NexusError::InvalidStatus(s.to_string())),
        }
    }
}

/// Immutable record of an entitlement transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionHistoryEntry {
    /// Entry ID
    pub id: HistoryEntryId,
    /// Account the transition belongs to
    pub account_id: AccountId,
    /// Tier being logged
    pub tier: Tier,
    /// When the logged entitlement started
    pub start_date: DateTime<Utc>,
    /// When it ended, if it has
    pub end_date: Option<DateTime<Utc>>,
    /// Status of the logged entitlement
    pub status: SubscriptionStatus,
    /// Free-text description
    pub notes: String,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}
