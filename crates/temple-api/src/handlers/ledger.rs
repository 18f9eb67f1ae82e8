//! Capacity ledger handlers
//!
//! Live counters plus the staff rebuild and consistency check.

use axum::{extract::State, Json};
use temple_core::Snowflake;
use temple_service::{LedgerSnapshot, LedgerVerification};

use crate::extractors::{SnowflakePath, StaffActor};
use crate::response::ApiResult;
use crate::state::AppState;

/// Current counters and remaining seats
///
/// GET /events/{event_id}/ledger
pub async fn get_ledger(
    State(state): State<AppState>,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<LedgerSnapshot>> {
    let snapshot = state.service_context().ledger().snapshot(event_id).await?;
    Ok(Json(snapshot))
}

/// Recompute the counters from storage
///
/// POST /events/{event_id}/ledger/rebuild
pub async fn rebuild_ledger(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<LedgerSnapshot>> {
    let snapshot = state.service_context().ledger().rebuild(event_id).await?;
    Ok(Json(snapshot))
}

/// Compare cached counters with a full scan
///
/// GET /events/{event_id}/ledger/verify
pub async fn verify_ledger(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<LedgerVerification>> {
    let verification = state.service_context().ledger().verify(event_id).await?;
    Ok(Json(verification))
}
