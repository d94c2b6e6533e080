//! Referral code and referral statistics types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NexusError;

/// Characters a referral code suffix is drawn from (uppercase base-36)
pub const REFERRAL_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Human-shareable referral code, e.g. `NEXUS-7K2Q9Z`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Build a code from a prefix and an already-drawn suffix
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self(format!("{prefix}-{suffix}"))
    }

    /// Parse a code, checking it has the `PREFIX-XXXXXX` shape with the given
    /// prefix and suffix length.
    pub fn parse(s: &str, prefix: &str, suffix_len: usize) -> Result<Self, NexusError> {
        let invalid = || NexusError::InvalidReferralCode(s.to_string());

        let suffix = s
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(invalid)?;

        if suffix.len() != suffix_len || !suffix.bytes().all(|b| REFERRAL_ALPHABET.contains(&b)) {
            return Err(invalid());
        }

        Ok(Self(s.to_string()))
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code, returning the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Referral counter categories, one per tier a referred account can buy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralCategory {
    ReferredFree,
    ReferredChapterwise,
    ReferredFullLength,
    ReferredDpp,
    ReferredCombo,
}

impl ReferralCategory {
    /// Every category, in the order counters are initialised
    pub const ALL: [ReferralCategory; 5] = [
        Self::ReferredFree,
        Self::ReferredChapterwise,
        Self::ReferredFullLength,
        Self::ReferredDpp,
        Self::ReferredCombo,
    ];

    /// Key used in the `referral_stats` object
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReferredFree => "referred_free",
            Self::ReferredChapterwise => "referred_chapterwise",
            Self::ReferredFullLength => "referred_full_length",
            Self::ReferredDpp => "referred_dpp",
            Self::ReferredCombo => "referred_combo",
        }
    }
}

/// Fresh `referral_stats` object with every category counter at zero
pub fn zeroed_referral_stats() -> Value {
    let counters: Map<String, Value> = ReferralCategory::ALL
        .iter()
        .map(|category| (category.as_str().to_string(), Value::from(0)))
        .collect();
    Value::Object(counters)
}

/// Whether a submitted `referral_stats` value is usable as-is.
///
/// Anything that is not a non-empty JSON object gets replaced by
/// [`zeroed_referral_stats`]. A populated object is kept without checking its
/// keys.
pub fn referral_stats_populated(stats: Option<&Value>) -> bool {
    matches!(stats, Some(Value::Object(map)) if !map.is_empty())
}
