// ============================================================================
// Axum Routes Module
// ============================================================================
//
// HTTP surface of the matching backend.
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - health.rs: Health check endpoint
// - donors.rs: Donor profile and dashboard endpoints
// - recipients.rs: Blood request and connection request endpoints
// - profile.rs: Cross-role profile facade
// - extractors.rs: Custom Axum extractors (JWT)
// - middleware.rs: Request logging
//
// ============================================================================

mod donors;
mod extractors;
mod health;
mod middleware;
mod profile;
mod recipients;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Donor profiles and dashboards
        .route("/api/donor/profile", post(donors::save_profile))
        .route("/api/donor/me", get(donors::my_profile))
        .route("/api/donor/availability", put(donors::update_availability))
        .route("/api/donor/available", get(donors::available_donors))
        .route("/api/donor/requests", get(donors::incoming_requests))
        .route("/api/donor/all-recipients", get(donors::all_recipients))
        .route("/api/donor/:id", delete(donors::delete_profile))
        // Blood requests and connection requests
        .route("/api/recipient/request", post(recipients::create_request))
        .route("/api/recipient/all", get(recipients::pending_requests))
        .route("/api/recipient/mine", get(recipients::my_requests))
        .route("/api/recipient/sent", get(recipients::sent_requests))
        .route("/api/recipient/send-request", post(recipients::send_request))
        .route(
            "/api/recipient/cancel-request",
            post(recipients::cancel_request),
        )
        .route("/api/recipient/:id", delete(recipients::delete_request))
        // Profile facade
        .route("/api/profile/me", get(profile::get_profile))
        .route("/api/profile/update", put(profile::update_profile))
        .route("/api/profile/delete", delete(profile::delete_account))
        .route("/api/profile/check", get(profile::check_profile))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                // Tracing layer (outermost - runs first)
                .layer(TraceLayer::new_for_http())
                // Request logging
                .layer(axum::middleware::from_fn(
                    crate::routes::middleware::request_logging,
                ))
                .into_inner(),
        )
        .with_state(app_context)
}
