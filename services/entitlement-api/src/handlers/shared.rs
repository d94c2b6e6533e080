//! Shared handler utilities
//!
//! Input validation and metrics helpers used across handlers.

use std::time::Instant;

use crate::error::ApiError;

/// Maximum length for user-provided strings
const MAX_STRING_LEN: usize = 256;

/// Default number of history entries returned per request
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound on history entries returned per request
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Validate a user-provided string is within safe bounds.
pub fn validate_string_length(value: &str, field_name: &str) -> Result<(), ApiError> {
    if value.len() > MAX_STRING_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field_name} too long (max {MAX_STRING_LEN} chars)"
        )));
    }
    Ok(())
}

/// Clamp a requested page size to `1..=MAX_HISTORY_LIMIT`
pub fn history_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "entitlement_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_string_length() {
        assert!(validate_string_length("short", "test").is_ok());

        let long_string = "a".repeat(MAX_STRING_LEN + 1);
        assert!(validate_string_length(&long_string, "test").is_err());
    }

    #[test]
    fn test_history_limit() {
        assert_eq!(history_limit(None), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history_limit(Some(0)), 1);
        assert_eq!(history_limit(Some(-5)), 1);
        assert_eq!(history_limit(Some(10)), 10);
        assert_eq!(history_limit(Some(10_000)), MAX_HISTORY_LIMIT);
    }
}
