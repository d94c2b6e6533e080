//! Entitlement configuration

use chrono::{DateTime, Months, Utc};

/// How long a free-tier entitlement lasts, in calendar years
pub const FREE_TIER_HORIZON_YEARS: u32 = 100;

/// Default prefix for referral codes
pub const DEFAULT_REFERRAL_PREFIX: &str = "NEXUS";

/// Default number of random characters after the prefix
pub const DEFAULT_REFERRAL_SUFFIX_LEN: usize = 6;

/// Default cap on referral code draws per account
pub const DEFAULT_REFERRAL_MAX_ATTEMPTS: u32 = 50;

/// Default number of lapsed accounts read per query
pub const DEFAULT_RECONCILE_BATCH_SIZE: i64 = 500;

/// Entitlement service configuration
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    /// Free-tier expiry offset in years
    pub free_tier_horizon_years: u32,
    /// Referral code prefix (without the hyphen)
    pub referral_prefix: String,
    /// Referral code suffix length
    pub referral_suffix_len: usize,
    /// Referral code draws before giving up
    pub referral_max_attempts: u32,
    /// Page size for the lapsed-account scan
    pub reconcile_batch_size: i64,
}

impl EntitlementConfig {
    /// Create a config with the default policy constants
    pub fn new() -> Self {
        Self {
            free_tier_horizon_years: FREE_TIER_HORIZON_YEARS,
            referral_prefix: DEFAULT_REFERRAL_PREFIX.to_string(),
            referral_suffix_len: DEFAULT_REFERRAL_SUFFIX_LEN,
            referral_max_attempts: DEFAULT_REFERRAL_MAX_ATTEMPTS,
            reconcile_batch_size: DEFAULT_RECONCILE_BATCH_SIZE,
        }
    }

    /// Set the free-tier horizon
    pub fn with_free_tier_horizon_years(mut self, years: u32) -> Self {
        self.free_tier_horizon_years = years;
        self
    }

    /// Set the referral code prefix
    pub fn with_referral_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.referral_prefix = prefix.into();
        self
    }

    /// Set the referral code suffix length
    pub fn with_referral_suffix_len(mut self, len: usize) -> Self {
        self.referral_suffix_len = len;
        self
    }

    /// Set the referral code attempt cap (at least one attempt is always made)
    pub fn with_referral_max_attempts(mut self, attempts: u32) -> Self {
        self.referral_max_attempts = attempts.max(1);
        self
    }

    /// Set the lapsed-account page size
    pub fn with_reconcile_batch_size(mut self, size: i64) -> Self {
        self.reconcile_batch_size = size.max(1);
        self
    }

    /// Expiry timestamp for a free-tier entitlement starting at `now`
    pub fn free_tier_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_months(Months::new(self.free_tier_horizon_years.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_free_tier_expiry_adds_calendar_years() {
        let config = EntitlementConfig::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let expiry = config.free_tier_expiry(now);

        assert_eq!(expiry.year(), 2126);
        assert_eq!(expiry.month(), 10);
        assert_eq!(expiry.day(), 19);
        assert_eq!(expiry.time(), now.time());
    }

    #[test]
    fn test_free_tier_expiry_clamps_leap_day() {
        let config = EntitlementConfig::new().with_free_tier_horizon_years(1);
        let now = Utc.with_ymd_and_hms(2028, 2, 29, 0, 0, 0).unwrap();
        let expiry = config.free_tier_expiry(now);

        assert_eq!((expiry.year(), expiry.month(), expiry.day()), (2029, 2, 28));
    }

    #[test]
    fn test_builder_floors() {
        let config = EntitlementConfig::new()
            .with_referral_max_attempts(0)
            .with_reconcile_batch_size(0);
        assert_eq!(config.referral_max_attempts, 1);
        assert_eq!(config.reconcile_batch_size, 1);
    }
}
