//! Configuration for the Entitlement API service.

use nexus_entitlement_core::config::{
    EntitlementConfig, DEFAULT_RECONCILE_BATCH_SIZE, DEFAULT_REFERRAL_MAX_ATTEMPTS,
    DEFAULT_REFERRAL_PREFIX, FREE_TIER_HORIZON_YEARS,
};
use std::time::Duration;

/// Entitlement API configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Shared secret expected in `X-Cron-Secret`; `None` when unset
    pub cron_secret: Option<String>,
    /// Entitlement policy configuration
    pub entitlement: EntitlementConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8090".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Cron secret is optional at startup; the endpoint reports 500 while unset
        let cron_secret = std::env::var("CRON_SECRET_TOKEN")
            .ok()
            .filter(|secret| !secret.is_empty());

        // Entitlement policy
        let free_tier_horizon_years: u32 = std::env::var("FREE_TIER_HORIZON_YEARS")
            .unwrap_or_else(|_| FREE_TIER_HORIZON_YEARS.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("FREE_TIER_HORIZON_YEARS"))?;

        let referral_prefix = std::env::var("REFERRAL_CODE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_REFERRAL_PREFIX.to_string());
        if referral_prefix.is_empty() || !referral_prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid("REFERRAL_CODE_PREFIX"));
        }

        let referral_max_attempts: u32 = std::env::var("REFERRAL_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_REFERRAL_MAX_ATTEMPTS.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REFERRAL_MAX_ATTEMPTS"))?;

        let reconcile_batch_size: i64 = std::env::var("RECONCILE_BATCH_SIZE")
            .unwrap_or_else(|_| DEFAULT_RECONCILE_BATCH_SIZE.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("RECONCILE_BATCH_SIZE"))?;

        // Request timeout
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let entitlement = EntitlementConfig::new()
            .with_free_tier_horizon_years(free_tier_horizon_years)
            .with_referral_prefix(referral_prefix)
            .with_referral_max_attempts(referral_max_attempts)
            .with_reconcile_batch_size(reconcile_batch_size);

        Ok(Self {
            http_port,
            database_url,
            cron_secret,
            entitlement,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("cron_secret_configured", &self.cron_secret.is_some())
            .field("entitlement", &self.entitlement)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish_non_exhaustive()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
