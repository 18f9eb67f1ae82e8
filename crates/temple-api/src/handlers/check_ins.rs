//! Check-in handlers
//!
//! Door staff and self check-in kiosks share these routes. Without an
//! `x-actor-id` header the record is attributed to the system actor.

use axum::{extract::State, Json};
use chrono::Utc;
use temple_core::Snowflake;
use temple_service::dto::{CheckInRecordResponse, CheckInStatusResponse};
use temple_service::CheckInService;

use crate::extractors::{RequestActor, SnowflakePath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Mark a registrant as present
///
/// POST /registrations/{registration_id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<CheckInRecordResponse>> {
    let record = CheckInService::new(state.service_context())
        .check_in(registration_id, actor, Utc::now())
        .await?;
    Ok(Json(record.into()))
}

/// Reverse the current check-in
///
/// POST /registrations/{registration_id}/check-in/undo
pub async fn undo_check_in(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<CheckInRecordResponse>> {
    let record = CheckInService::new(state.service_context())
        .undo_check_in(registration_id, actor, Utc::now())
        .await?;
    Ok(Json(record.into()))
}

/// GET /registrations/{registration_id}/check-in
pub async fn check_in_status(
    State(state): State<AppState>,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<CheckInStatusResponse>> {
    let checked_in = CheckInService::new(state.service_context())
        .is_checked_in(registration_id)
        .await?;
    Ok(Json(CheckInStatusResponse {
        registration_id: registration_id.to_string(),
        checked_in,
    }))
}

/// Audit trail, oldest first
///
/// GET /registrations/{registration_id}/check-ins
pub async fn check_in_history(
    State(state): State<AppState>,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<Vec<CheckInRecordResponse>>> {
    let history = CheckInService::new(state.service_context())
        .history(registration_id)
        .await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}
