//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{check_ins, events, health, ledger, registrations};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(event_routes())
        .merge(registration_routes())
}

/// Event lifecycle, capacity and ledger routes
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:event_id",
            get(events::get_event).patch(events::update_event),
        )
        .route("/events/:event_id/publish", post(events::publish_event))
        .route("/events/:event_id/close", post(events::close_event))
        .route("/events/:event_id/cancel", post(events::cancel_event))
        .route("/events/:event_id/capacity", put(events::resize_capacity))
        // Ledger
        .route("/events/:event_id/ledger", get(ledger::get_ledger))
        .route("/events/:event_id/ledger/rebuild", post(ledger::rebuild_ledger))
        .route("/events/:event_id/ledger/verify", get(ledger::verify_ledger))
        // Event registrations
        .route(
            "/events/:event_id/registrations",
            get(registrations::list_registrations).post(registrations::submit_registration),
        )
        .route(
            "/events/:event_id/registrations/manual",
            post(registrations::add_manual_registration),
        )
}

/// Registration and check-in routes
fn registration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/registrations/:registration_id",
            get(registrations::get_registration),
        )
        .route(
            "/registrations/:registration_id/cancel",
            post(registrations::cancel_registration),
        )
        .route(
            "/registrations/:registration_id/status",
            put(registrations::set_registration_status),
        )
        // Check-in
        .route(
            "/registrations/:registration_id/check-in",
            get(check_ins::check_in_status).post(check_ins::check_in),
        )
        .route(
            "/registrations/:registration_id/check-in/undo",
            post(check_ins::undo_check_in),
        )
        .route(
            "/registrations/:registration_id/check-ins",
            get(check_ins::check_in_history),
        )
}
