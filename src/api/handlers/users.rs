/*
 * Responsibility
 * - GET /auth/me: return the authenticated caller, unchanged
 * - Pure pass-through. The rate-limit and auth stages have already run, so
 *   nothing here can fail; the handler only shapes the row into UserResponse
 */
use axum::Json;

use crate::api::dto::users::UserResponse;
use crate::api::extractors::CurrentUser;

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
