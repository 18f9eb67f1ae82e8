//! Event handlers
//!
//! Endpoints for event creation, edits, listing and the publication
//! lifecycle. All writes require a staff actor.

use axum::{extract::State, Json};
use chrono::Utc;
use temple_core::{EventFilter, Snowflake};
use temple_service::dto::{
    CapacityChangeResponse, CreateEventRequest, EventResponse, EventSummaryResponse,
    ListEventsQuery, PaginatedResponse, ResizeCapacityRequest, UpdateEventRequest,
};
use temple_service::{EventService, QueryService};

use crate::extractors::{SnowflakePath, StaffActor, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create a draft event
///
/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> ApiResult<Created<Json<EventResponse>>> {
    let (organization_id, fields) = request.into_fields()?;
    let event = EventService::new(state.service_context())
        .create(organization_id, fields, actor, Utc::now())
        .await?;
    Ok(Created(Json(event.into())))
}

/// List events with their confirmed counts
///
/// GET /events?organization_id=&status=&keyword=&page=&page_size=
pub async fn list_events(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListEventsQuery>,
) -> ApiResult<Json<PaginatedResponse<EventSummaryResponse>>> {
    let pagination = query.pagination();
    let filter = EventFilter {
        organization_id: query.organization_id,
        status: query.status,
        keyword: query.keyword,
    };
    let page = QueryService::new(state.service_context())
        .list_events(filter, pagination)
        .await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get event by ID
///
/// GET /events/{event_id}
pub async fn get_event(
    State(state): State<AppState>,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(state.service_context()).get(event_id).await?;
    Ok(Json(event.into()))
}

/// Partial edit
///
/// PATCH /events/{event_id}
pub async fn update_event(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let patch = request.into_patch()?;
    let event = EventService::new(state.service_context())
        .edit(event_id, patch, Utc::now())
        .await?;
    Ok(Json(event.into()))
}

/// Change capacity, promoting from the waitlist when it grows
///
/// PUT /events/{event_id}/capacity
pub async fn resize_capacity(
    State(state): State<AppState>,
    _actor: StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
    ValidatedJson(request): ValidatedJson<ResizeCapacityRequest>,
) -> ApiResult<Json<CapacityChangeResponse>> {
    let capacity = request.into_capacity()?;
    let change = EventService::new(state.service_context())
        .resize_capacity(event_id, capacity, Utc::now())
        .await?;
    Ok(Json(change.into()))
}

/// POST /events/{event_id}/publish
pub async fn publish_event(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(state.service_context())
        .publish(event_id, actor, Utc::now())
        .await?;
    Ok(Json(event.into()))
}

/// POST /events/{event_id}/close
pub async fn close_event(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(state.service_context())
        .close(event_id, actor, Utc::now())
        .await?;
    Ok(Json(event.into()))
}

/// POST /events/{event_id}/cancel
pub async fn cancel_event(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    SnowflakePath(event_id): SnowflakePath<Snowflake>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(state.service_context())
        .cancel(event_id, actor, Utc::now())
        .await?;
    Ok(Json(event.into()))
}
