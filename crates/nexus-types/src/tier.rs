//! Subscription tier types

use serde::{Deserialize, Serialize};

/// Subscription tier levels
///
/// The paid catalogue is open-ended: tiers created by the purchase flow that
/// this crate does not know about are kept verbatim in [`Tier::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    /// Default tier, effectively non-expiring
    #[default]
    Free,
    /// Chapter-wise test series
    Chapterwise,
    /// Full-length mock tests
    FullLength,
    /// Daily practice problems
    Dpp,
    /// Bundle of every paid product
    Combo,
    /// Any other paid tier
    Other(String),
}

impl Tier {
    /// Storage and wire name of the tier
    pub fn as_str(&self) -> &str {
        match self {
            Self::Free => "free",
            Self::Chapterwise => "chapterwise",
            Self::FullLength => "full_length",
            Self::Dpp => "dpp",
            Self::Combo => "combo",
            Self::Other(name) => name,
        }
    }

    /// Whether this is the free tier
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Whether this tier carries a paid entitlement that can lapse
    pub fn is_paid(&self) -> bool {
        !self.is_free()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Tier {
    fn from(s: &str) -> Self {
        match s {
            "free" => Self::Free,
            "chapterwise" => Self::Chapterwise,
            "full_length" => Self::FullLength,
            "dpp" => Self::Dpp,
            "combo" => Self::Combo,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Tier> for String {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tiers_round_trip_through_names() {
        for tier in [Tier::Free, Tier::Chapterwise, Tier::FullLength, Tier::Dpp, Tier::Combo] {
            assert_eq!(Tier::from(tier.as_str()), tier);
        }
    }

    #[test]
    fn test_unknown_tier_is_kept_verbatim() {
        let tier = Tier::from("neet_crash_course");
        assert_eq!(tier, Tier::Other("neet_crash_course".to_string()));
        assert_eq!(tier.to_string(), "neet_crash_course");
        assert!(tier.is_paid());
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Tier::FullLength).unwrap();
        assert_eq!(json, "\"full_length\"");

        let tier: Tier = serde_json::from_str("\"combo\"").unwrap();
        assert_eq!(tier, Tier::Combo);
    }
}
