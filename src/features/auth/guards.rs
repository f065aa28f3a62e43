//! Role-based authorization guards.
//!
//! These guards extract the authenticated user and verify they have the required roles.
//!
//! Roles:
//! - admin: moderation and maintenance (deleting issues, archiving chat)
//! - ngo: claims issues, organises events, assigns jobs, receives donations
//! - volunteer / citizen: everything any authenticated user can do
//!
//! Admin passes every NGO check.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for NGO endpoints. Allows "ngo" and "admin".
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireNgo(user): RequireNgo) { ... }
/// ```
pub struct RequireNgo(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireNgo
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.has_ngo_access() {
            return Err(AppError::Forbidden("NGO access required".to_string()));
        }

        Ok(RequireNgo(user.clone()))
    }
}
