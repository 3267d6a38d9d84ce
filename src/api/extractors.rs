/*
 * Responsibility
 * - The type handlers see as "the authenticated caller"
 * - The auth stage verifies and inserts it into request extensions; handlers
 *   only ever receive this type, already resolved
 */
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::repos::user_repo::UserRow;

/// The caller resolved by the authentication stage.
///
/// Missing from extensions means the route was wired without the auth
/// middleware (or the middleware was bypassed); both answer 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized("Could not validate credentials"))
    }
}
