// ============================================================================
// Recipient Routes
// ============================================================================
//
// Endpoints:
// - POST /api/recipient/request - Post a blood request
// - GET /api/recipient/all - Pending postings (donor dashboard feed)
// - GET /api/recipient/mine - The caller's postings
// - GET /api/recipient/sent - Donors the caller has contacted
// - POST /api/recipient/send-request - Send a connection request to a donor
// - POST /api/recipient/cancel-request - Cancel a sent connection request
// - DELETE /api/recipient/:id - Delete a posting
//
// ============================================================================

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::db;
use crate::error::AppError;
use crate::models::{BloodGroup, Urgency, validate_contact_number};
use crate::routes::extractors::AuthenticatedUser;
use crate::utils::log_safe_id;

/// Request body for posting a blood request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequest {
    pub patient_name: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub hospital_name: Option<String>,
    pub contact_number: Option<String>,
    pub urgency: Option<String>,
    pub units_required: Option<i32>,
}

/// POST /api/recipient/request
/// Post a blood request; a user may hold several postings at once
pub async fn create_request(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<CreateBloodRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Required fields (absent and empty are both missing)
    let patient_name = request.patient_name.as_deref().unwrap_or("");
    let blood_group = request.blood_group.as_deref().unwrap_or("");
    let city = request.city.as_deref().unwrap_or("");
    let hospital_name = request.hospital_name.as_deref().unwrap_or("");
    let contact_number = request.contact_number.as_deref().unwrap_or("");
    let urgency = request.urgency.as_deref().unwrap_or("");
    if patient_name.is_empty()
        || blood_group.is_empty()
        || city.is_empty()
        || hospital_name.is_empty()
        || contact_number.is_empty()
        || urgency.is_empty()
    {
        return Err(AppError::validation("Please fill all required fields"));
    }
    let units_required = request
        .units_required
        .ok_or_else(|| AppError::validation("Please fill all required fields"))?;

    // 2. Validate before touching the store
    let blood_group: BloodGroup = blood_group.parse()?;
    let urgency: Urgency = urgency.parse()?;
    validate_contact_number(contact_number)?;
    if units_required < 1 {
        return Err(AppError::validation("At least one unit is required"));
    }

    // 3. Insert with status pending
    db::recipients::insert(
        &app_context.db_pool,
        &user.id,
        &db::recipients::NewBloodRequest {
            patient_name,
            blood_group: blood_group.as_str(),
            city,
            hospital_name,
            contact_number,
            urgency: urgency.as_str(),
            units_required,
        },
    )
    .await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        "Blood request submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Blood request submitted successfully!" })),
    ))
}

/// GET /api/recipient/all
/// Postings still pending, newest first, for the donor dashboard feed
pub async fn pending_requests(
    State(app_context): State<Arc<AppContext>>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let requests = db::recipients::list_pending(&app_context.db_pool).await?;
    Ok(Json(requests))
}

/// GET /api/recipient/mine
/// The caller's postings, newest first
pub async fn my_requests(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let requests = db::recipients::list_by_user(&app_context.db_pool, &user.id).await?;
    Ok(Json(requests))
}

/// GET /api/recipient/sent
/// Donors the caller has sent connection requests to, oldest first
pub async fn sent_requests(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let sent = db::requests::list_sent_by_user(&app_context.db_pool, &user.id).await?;
    Ok(Json(sent))
}

/// Request body naming the donor a connection request targets
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTarget {
    pub donor_id: Option<String>,
}

/// POST /api/recipient/send-request
/// Send a connection request to a donor; at most one per (donor, sender) pair
pub async fn send_request(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<ConnectionTarget>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Target donor id is required
    let donor_id = request
        .donor_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Donor ID is required"))?;
    let donor_id = Uuid::parse_str(donor_id)?;

    // 2. The donor must exist
    db::donors::get_by_id(&app_context.db_pool, &donor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Donor not found"))?;

    // 3. Atomic insert; a duplicate pair inserts nothing
    let inserted = db::requests::insert_unique(&app_context.db_pool, &donor_id, &user.id).await?;
    if !inserted {
        return Err(AppError::conflict(
            "You have already sent a request to this donor.",
        ));
    }

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        "Connection request sent"
    );

    Ok(Json(json!({ "message": "Request sent successfully!" })))
}

/// POST /api/recipient/cancel-request
/// Cancel the caller's connection request to a donor. Cancelling a request
/// that does not exist still succeeds.
pub async fn cancel_request(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<ConnectionTarget>,
) -> Result<impl IntoResponse, AppError> {
    let donor_id = request
        .donor_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Donor ID is required"))?;
    let donor_id = Uuid::parse_str(donor_id)?;

    db::donors::get_by_id(&app_context.db_pool, &donor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Donor not found"))?;

    let removed = db::requests::delete_for_pair(&app_context.db_pool, &donor_id, &user.id).await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        removed = removed,
        "Connection request cancelled"
    );

    Ok(Json(json!({ "message": "Request cancelled successfully!" })))
}

/// DELETE /api/recipient/:id
/// Delete a posting; only the owner may delete it
pub async fn delete_request(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = Uuid::parse_str(&id)?;

    // 1. The posting must exist
    let posting = db::recipients::get_by_id(&app_context.db_pool, &request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Request not found"))?;

    // 2. Ownership check
    if posting.user_id != user.id {
        return Err(AppError::auth("Not authorized"));
    }

    // 3. Delete
    db::recipients::delete_by_id(&app_context.db_pool, &request_id).await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        "Blood request deleted"
    );

    Ok(Json(json!({ "message": "Request deleted successfully" })))
}
