use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::context::AppContext;
use crate::error::ApiError;
use crate::filter::FilterSpec;
use crate::store::Collection;

use super::auth::AuthUser;

/// Admin role gate. Must run after `require_auth`.
///
/// Re-reads the caller's user record on every request so a role revoked
/// mid-session takes effect on the very next call.
pub async fn require_admin(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: No token provided"))?;

    let email = auth_user
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::forbidden("Forbidden: No email found in token"))?;

    let user = ctx
        .data
        .users
        .find_one(FilterSpec::new().eq("email", email))
        .await
        .map_err(|e| ApiError::store("Failed to verify admin role", e))?;

    let is_admin = user
        .as_ref()
        .and_then(|u| u.field_str("role"))
        .map_or(false, |role| role == "admin");

    if !is_admin {
        tracing::warn!("Admin gate rejected {}", email);
        return Err(ApiError::forbidden("Forbidden: Admins only"));
    }

    Ok(next.run(request).await)
}
