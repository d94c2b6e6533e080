//! Account handlers

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use nexus_db::AccountRow;
use nexus_entitlement_core::AccountDraft;
use nexus_types::{AccountId, SubscriptionHistoryEntry, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::shared::{history_limit, record_op_duration, validate_string_length};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub class_status: Option<String>,
    pub role: String,
    pub subscription_tier: String,
    pub subscription_expiry_date: DateTime<Utc>,
    pub user_referral_code: String,
    pub referral_stats: serde_json::Value,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for AccountResponse {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            class_status: row.class_status,
            role: row.role,
            subscription_tier: row.subscription_tier,
            subscription_expiry_date: row.subscription_expiry_date,
            user_referral_code: row.user_referral_code,
            referral_stats: row.referral_stats,
            total_points: row.total_points,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub tier: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: SubscriptionStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionHistoryEntry> for HistoryEntryResponse {
    fn from(entry: SubscriptionHistoryEntry) -> Self {
        Self {
            id: entry.id.0,
            tier: entry.tier.to_string(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            status: entry.status,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/accounts
#[instrument(skip(state, draft))]
pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<AccountDraft>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let start = Instant::now();

    validate_string_length(&draft.email, "email")?;
    if let Some(class_status) = &draft.class_status {
        validate_string_length(class_status, "class_status")?;
    }

    let result = state.entitlements.create_account(draft).await;
    record_op_duration("create_account", start, result.is_ok());

    let account = result?;
    metrics::counter!("entitlement_accounts_created_total", "role" => account.role().as_str())
        .increment(1);

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /api/v1/accounts/{id}
#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state.entitlements.get_account(&AccountId(id)).await?;
    Ok(Json(account.into()))
}

/// GET /api/v1/accounts/{id}/subscriptions
#[instrument(skip(state))]
pub async fn list_subscription_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<Vec<HistoryEntryResponse>>> {
    let account_id = AccountId(id);

    // 404 for unknown accounts rather than an empty list
    state.entitlements.get_account(&account_id).await?;

    let entries = state
        .entitlements
        .subscription_history(&account_id, history_limit(query.limit))
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
