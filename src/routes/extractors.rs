// ============================================================================
// Axum Extractors
// ============================================================================
//
// Custom extractors for Axum routes:
// - AuthenticatedUser: Extracts and validates the JWT from the Authorization
//   header and exposes the caller's user id and declared role
//
// ============================================================================

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::AppError;
use crate::models::Role;

/// Extractor for the authenticated caller
///
/// Usage:
/// ```rust,ignore
/// async fn handler(user: AuthenticatedUser, ...) -> Result<...> {
///     let user_id = user.id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, parts).map_err(|e| {
            tracing::warn!(error = %e, "JWT authentication failed");
            e.into_response()
        })
    }
}

/// Resolves the caller from the bearer token in the Authorization header
fn authenticate(ctx: &AppContext, parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    // Get Authorization header
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Auth("Missing Authorization header".to_string()))?;

    // Extract token (format: "Bearer <token>")
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid Authorization header format".to_string()))?;

    // Verify and decode JWT
    let claims = ctx
        .auth_manager
        .verify_token(token)
        .map_err(|e| AppError::Auth(format!("Invalid or expired token: {}", e)))?;

    // Tokens are minted by the auth service; malformed claims are an auth
    // failure, not a client validation error
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;
    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AppError::Auth("Token carries an unknown role".to_string()))?;

    Ok(AuthenticatedUser { id, role })
}
