//! Registration handlers
//!
//! Self-service submission and cancellation, plus staff entry, status
//! overrides and listing.

use axum::{extract::State, Json};
use chrono::Utc;
use temple_core::{RegistrationFilter, Snowflake};
use temple_service::dto::{
    ListRegistrationsQuery, ManualRegistrationRequest, PaginatedResponse,
    RegistrationChangeResponse, RegistrationResponse, SetRegistrationStatusRequest,
    SubmitRegistrationRequest,
};
use temple_service::{QueryService, RegistrationService};

use crate::extractors::{SnowflakePath, StaffActor, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Self-service registration
///
/// POST /events/{event_id}/registrations
pub async fn submit_registration(
    State(state): State<AppState>,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<SubmitRegistrationRequest>,
) -> ApiResult<Created<Json<RegistrationResponse>>> {
    let registration = RegistrationService::new(state.service_context())
        .submit(event_id, request.registrant, request.user_id, Utc::now())
        .await?;
    Ok(Created(Json(registration.into())))
}

/// Staff-entered registration
///
/// POST /events/{event_id}/registrations/manual
pub async fn add_manual_registration(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<ManualRegistrationRequest>,
) -> ApiResult<Created<Json<RegistrationResponse>>> {
    let registration = RegistrationService::new(state.service_context())
        .manual_add(event_id, request.registrant, Utc::now())
        .await?;
    Ok(Created(Json(registration.into())))
}

/// Registrations of one event
///
/// GET /events/{event_id}/registrations?status=&keyword=&page=&page_size=
pub async fn list_registrations(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
    ValidatedQuery(query): ValidatedQuery<ListRegistrationsQuery>,
) -> ApiResult<Json<PaginatedResponse<RegistrationResponse>>> {
    let pagination = query.pagination();
    let filter = RegistrationFilter {
        status: query.status,
        keyword: query.keyword,
        ..RegistrationFilter::for_event(event_id)
    };
    let page = QueryService::new(state.service_context())
        .list_registrations(filter, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get registration by ID
///
/// GET /registrations/{registration_id}
pub async fn get_registration(
    State(state): State<AppState>,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RegistrationResponse>> {
    let registration = RegistrationService::new(state.service_context())
        .get(registration_id)
        .await?;
    Ok(Json(registration.into()))
}

/// Cancel a registration
///
/// POST /registrations/{registration_id}/cancel
pub async fn cancel_registration(
    State(state): State<AppState>,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<RegistrationChangeResponse>> {
    let change = RegistrationService::new(state.service_context())
        .cancel(registration_id, Utc::now())
        .await?;
    Ok(Json(change.into()))
}

/// Staff status override
///
/// PUT /registrations/{registration_id}/status
pub async fn set_registration_status(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(registration_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<SetRegistrationStatusRequest>,
) -> ApiResult<Json<RegistrationChangeResponse>> {
    let change = RegistrationService::new(state.service_context())
        .set_status(registration_id, request.status, Utc::now())
        .await?;
    Ok(Json(change.into()))
}
