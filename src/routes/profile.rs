// ============================================================================
// Profile Facade Routes
// ============================================================================
//
// Endpoints:
// - GET /api/profile/me - Identity record plus role-specific profile data
// - PUT /api/profile/update - Update identity and role fields together
// - DELETE /api/profile/delete - Delete the account and its role records
// - GET /api/profile/check - Whether a role record exists for the caller
//
// The caller's declared role (from the token claims) decides which role
// record the facade reads and writes; body fields that belong to the other
// role are ignored.
//
// ============================================================================

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::db;
use crate::error::AppError;
use crate::models::{BloodGroup, Role, Urgency, validate_contact_number};
use crate::routes::extractors::AuthenticatedUser;
use crate::utils::log_safe_id;

/// Identity record with credentials redacted
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<db::users::User> for UserView {
    fn from(user: db::users::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Role-specific profile data, tagged by kind
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProfileData {
    Donor(db::donors::Donor),
    Recipient(db::recipients::Recipient),
}

/// GET /api/profile/me
/// The caller's identity record plus the role record matching their
/// declared role (a recipient's most recent posting), or null
pub async fn get_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let record = db::users::get_user_by_id(&app_context.db_pool, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let profile_data = match user.role {
        Role::Donor => db::donors::get_by_user_id(&app_context.db_pool, &user.id)
            .await?
            .map(ProfileData::Donor),
        Role::Recipient => db::recipients::latest_for_user(&app_context.db_pool, &user.id)
            .await?
            .map(ProfileData::Recipient),
    };

    Ok(Json(json!({
        "user": UserView::from(record),
        "profileData": profile_data,
    })))
}

/// Request body for the combined profile update. Identity fields apply to
/// the user record; the rest apply to the role record for the caller's role.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
    pub patient_name: Option<String>,
    pub hospital_name: Option<String>,
    pub urgency: Option<String>,
    pub units_required: Option<i32>,
}

/// Role fields validated and ready to write
enum RoleFields<'a> {
    Donor {
        blood_group: Option<BloodGroup>,
        city: Option<&'a str>,
        contact_number: Option<&'a str>,
    },
    Recipient {
        patient_name: Option<&'a str>,
        hospital_name: Option<&'a str>,
        city: Option<&'a str>,
        contact_number: Option<&'a str>,
        urgency: Option<Urgency>,
        units_required: Option<i32>,
    },
}

/// PUT /api/profile/update
/// Update name/email/password and the caller's role record in one call.
/// Empty-string fields count as absent; nothing is written until every
/// provided field has validated.
pub async fn update_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. The identity record must exist
    db::users::get_user_by_id(&app_context.db_pool, &user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    // 2. Identity fields
    let name = request.name.as_deref().filter(|s| !s.is_empty());
    let email = request.email.as_deref().filter(|s| !s.is_empty());
    let password = request.password.as_deref().filter(|s| !s.is_empty());

    // Email must stay unique across the directory
    if let Some(new_email) = email
        && let Some(existing) = db::users::get_user_by_email(&app_context.db_pool, new_email).await?
        && existing.id != user.id
    {
        return Err(AppError::validation("Email is already in use"));
    }

    // 3. Role fields, validated before anything is written
    let role_fields = match user.role {
        Role::Donor => {
            let blood_group = match request.blood_group.as_deref().filter(|s| !s.is_empty()) {
                Some(value) => Some(value.parse::<BloodGroup>()?),
                None => None,
            };
            let contact_number = request.contact_number.as_deref().filter(|s| !s.is_empty());
            if let Some(value) = contact_number {
                validate_contact_number(value)?;
            }
            RoleFields::Donor {
                blood_group,
                city: request.city.as_deref().filter(|s| !s.is_empty()),
                contact_number,
            }
        }
        Role::Recipient => {
            let urgency = match request.urgency.as_deref().filter(|s| !s.is_empty()) {
                Some(value) => Some(value.parse::<Urgency>()?),
                None => None,
            };
            let contact_number = request.contact_number.as_deref().filter(|s| !s.is_empty());
            if let Some(value) = contact_number {
                validate_contact_number(value)?;
            }
            if let Some(units) = request.units_required
                && units < 1
            {
                return Err(AppError::validation("At least one unit is required"));
            }
            RoleFields::Recipient {
                patient_name: request.patient_name.as_deref().filter(|s| !s.is_empty()),
                hospital_name: request.hospital_name.as_deref().filter(|s| !s.is_empty()),
                city: request.city.as_deref().filter(|s| !s.is_empty()),
                contact_number,
                urgency,
                units_required: request.units_required,
            }
        }
    };

    // 4. Identity update; a new password is re-hashed with bcrypt
    let password_hash = match password {
        Some(value) => Some(bcrypt::hash(value, bcrypt::DEFAULT_COST)?),
        None => None,
    };
    let updated_user =
        db::users::update_user(&app_context.db_pool, &user.id, name, email, password_hash.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

    // 5. Role record update; doing nothing when the record is absent
    //    mirrors the identity/role split on deletion
    match role_fields {
        RoleFields::Donor {
            blood_group,
            city,
            contact_number,
        } => {
            db::donors::update_fields(
                &app_context.db_pool,
                &user.id,
                blood_group.map(|b| b.as_str()),
                city,
                contact_number,
            )
            .await?;
        }
        RoleFields::Recipient {
            patient_name,
            hospital_name,
            city,
            contact_number,
            urgency,
            units_required,
        } => {
            db::recipients::update_latest_for_user(
                &app_context.db_pool,
                &user.id,
                patient_name,
                hospital_name,
                city,
                contact_number,
                urgency.map(|u| u.as_str()),
                units_required,
            )
            .await?;
        }
    }

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        "Profile updated"
    );

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": UserView::from(updated_user),
    })))
}

/// DELETE /api/profile/delete
/// Delete the caller's account. Role records go first, the identity row
/// last.
pub async fn delete_account(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let donor_removed = db::donors::delete_by_user_id(&app_context.db_pool, &user.id).await?;
    let postings_removed =
        db::recipients::delete_by_user_id(&app_context.db_pool, &user.id).await?;
    db::users::delete_user(&app_context.db_pool, &user.id).await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), &app_context.config.logging.hash_salt),
        donor_removed = donor_removed,
        postings_removed = postings_removed,
        "Account deleted"
    );

    Ok(Json(json!({
        "message": "Account and related profile deleted successfully"
    })))
}

/// GET /api/profile/check
/// Whether a role record exists for the caller's declared role. The client
/// uses this after login to choose between the dashboard and the intake form.
pub async fn check_profile(
    State(app_context): State<Arc<AppContext>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let exists = match user.role {
        Role::Donor => db::donors::exists_for_user(&app_context.db_pool, &user.id).await?,
        Role::Recipient => db::recipients::exists_for_user(&app_context.db_pool, &user.id).await?,
    };

    if exists {
        Ok(Json(json!({ "exists": true, "role": user.role })))
    } else {
        Ok(Json(json!({ "exists": false })))
    }
}
