// ============================================================================
// Donor Routes
// ============================================================================
//
// Endpoints:
// - POST /api/donor/profile - Create or update the caller's donor profile
// - GET /api/donor/me - Get the caller's donor profile
// - PUT /api/donor/availability - Overwrite the availability flag
// - GET /api/donor/available - List available donors (recipient dashboard)
// - GET /api/donor/requests - Connection requests received by the caller
// - GET /api/donor/all-recipients - All recipient postings (donor dashboard)
// - DELETE /api/donor/:id - Delete a donor profile
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
use crate::models::{Availability, BloodGroup, validate_contact_number};
use crate::routes::extractors::AuthenticatedUser;
use crate::utils::log_safe_id;

/// Request body for creating or updating a donor profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
    pub availability: Option<String>,
    pub additional_info: Option<String>,
}

/// POST /api/donor/profile
/// Create or update the caller's donor profile (one per user)
pub async fn save_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<SaveProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Required fields (absent and empty are both missing)
    let blood_group = request.blood_group.as_deref().unwrap_or("");
    let city = request.city.as_deref().unwrap_or("");
    let contact_number = request.contact_number.as_deref().unwrap_or("");
    if blood_group.is_empty() || city.is_empty() || contact_number.is_empty() {
        return Err(AppError::validation("Please fill all required fields."));
    }

    // 2. Validate before touching the store
    let blood_group: BloodGroup = blood_group.parse()?;
    validate_contact_number(contact_number)?;
    let availability = match request.availability.as_deref() {
        Some(value) => Some(value.parse::<Availability>()?),
        None => None,
    };

    // 3. Upsert keyed on the caller's user id
    let inserted = db::donors::upsert_profile(
        &app_context.db_pool,
        &user.id,
        blood_group.as_str(),
        city,
        contact_number,
        availability.map(|a| a.as_str()),
        request.additional_info.as_deref(),
    )
    .await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        created = inserted,
        "Donor profile saved"
    );

    if inserted {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Donor profile created successfully!" })),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(json!({ "message": "Donor profile updated successfully!" })),
        ))
    }
}

/// GET /api/donor/me
/// Get the caller's donor profile
pub async fn my_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let donor = db::donors::get_by_user_id(&app_context.db_pool, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("No donor profile found."))?;

    Ok(Json(donor))
}

/// Request body for the availability toggle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    pub availability: Option<String>,
}

/// PUT /api/donor/availability
/// Overwrite the caller's availability flag with "yes" or "no"
pub async fn update_availability(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let availability = request
        .availability
        .as_deref()
        .unwrap_or("")
        .parse::<Availability>()?;

    let updated =
        db::donors::set_availability(&app_context.db_pool, &user.id, availability.as_str()).await?;
    if !updated {
        return Err(AppError::not_found("Donor profile not found"));
    }

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        availability = availability.as_str(),
        "Availability updated"
    );

    Ok(Json(json!({
        "message": format!("Availability updated to {}", availability.as_str())
    })))
}

/// GET /api/donor/available
/// List donors currently marked available, with their directory name/email
pub async fn available_donors(
    State(app_context): State<Arc<AppContext>>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let donors = db::donors::list_available(&app_context.db_pool).await?;
    Ok(Json(donors))
}

/// GET /api/donor/requests
/// Connection requests received by the caller's donor profile, oldest first
pub async fn incoming_requests(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    // Requests hang off the donor profile, so the caller needs one
    let donor = db::donors::get_by_user_id(&app_context.db_pool, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Donor profile not found"))?;

    let requests = db::requests::list_for_donor(&app_context.db_pool, &donor.id).await?;
    Ok(Json(requests))
}

/// GET /api/donor/all-recipients
/// Every recipient posting, newest first, trimmed for the donor dashboard
pub async fn all_recipients(
    State(app_context): State<Arc<AppContext>>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let recipients = db::recipients::list_all(&app_context.db_pool).await?;
    Ok(Json(recipients))
}

/// DELETE /api/donor/:id
/// Delete a donor profile; only the owner may delete it
pub async fn delete_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let donor_id = Uuid::parse_str(&id)?;

    // 1. The profile must exist
    let donor = db::donors::get_by_id(&app_context.db_pool, &donor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Donor profile not found"))?;

    // 2. Ownership check
    if donor.user_id != user.id {
        return Err(AppError::auth("Not authorized"));
    }

    // 3. Delete; received connection requests go with the profile
    db::donors::delete_by_id(&app_context.db_pool, &donor_id).await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        "Donor profile deleted"
    );

    Ok(Json(json!({ "message": "Donor profile deleted successfully" })))
}
