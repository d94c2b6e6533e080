//! Expiry reconciliation handler
//!
//! Called by an external scheduler (cron) to downgrade lapsed paid accounts.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use nexus_entitlement_core::{DowngradedAccount, ReconciliationReport};
use serde::Serialize;
use tracing::instrument;

use super::shared::record_op_duration;
use crate::error::{ApiError, ApiResult};
use crate::extract::CronAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckExpiriesResponse {
    pub message: &'static str,
    pub processed_count: usize,
    pub downgraded_users: Vec<DowngradedUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DowngradedUser {
    pub user_id: String,
    pub old_tier: String,
    pub new_tier: String,
}

impl From<DowngradedAccount> for DowngradedUser {
    fn from(account: DowngradedAccount) -> Self {
        Self {
            user_id: account.account_id.to_string(),
            old_tier: account.old_tier.to_string(),
            new_tier: account.new_tier.to_string(),
        }
    }
}

impl From<ReconciliationReport> for CheckExpiriesResponse {
    fn from(report: ReconciliationReport) -> Self {
        Self {
            message: "Subscription expiry check completed successfully.",
            processed_count: report.processed_count,
            downgraded_users: report.downgraded.into_iter().map(Into::into).collect(),
        }
    }
}

/// POST /custom/check-expiries
///
/// Requires the `X-Cron-Secret` header.
#[instrument(skip(state))]
pub async fn check_expiries(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<CheckExpiriesResponse>> {
    let start = Instant::now();

    match state.entitlements.reconcile_expiries().await {
        Ok(report) => {
            metrics::counter!("entitlement_reconcile_runs_total", "result" => "ok").increment(1);
            metrics::counter!("entitlement_accounts_downgraded_total")
                .increment(report.processed_count as u64);
            record_op_duration("check_expiries", start, true);

            tracing::info!(
                processed_at = %report.processed_at,
                processed_count = report.processed_count,
                "Expiry check served"
            );
            Ok(Json(report.into()))
        }
        Err(e) => {
            metrics::counter!("entitlement_reconcile_runs_total", "result" => "err").increment(1);
            record_op_duration("check_expiries", start, false);
            Err(ApiError::ExpiryCheckFailed(e))
        }
    }
}
