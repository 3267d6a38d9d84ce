//! Authentication stage: Bearer access token → user row → request extensions.
//!
//! Handlers behind this stage receive a fully resolved `CurrentUser` and can
//! no longer fail on credentials; everything invalid is rejected here with a
//! typed 401.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::CurrentUser;
use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::auth::TokenScope;
use crate::state::AppState;

const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

/// Require an authenticated caller for every route in `router`.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // from_fn cannot receive a State extractor; pass state explicitly.
    router.layer(middleware::from_fn_with_state(state, require_user))
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token =
        bearer_token(req.headers()).ok_or(AppError::Unauthorized(CREDENTIALS_MESSAGE))?;

    let email = state
        .tokens
        .verify(token, TokenScope::Access)
        .map_err(|err| {
            tracing::warn!(error = %err, "access token verification failed");
            AppError::Unauthorized(CREDENTIALS_MESSAGE)
        })?;

    let user = user_repo::get_by_email(&state.db, &email)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::Unauthorized(CREDENTIALS_MESSAGE))?;

    // middleware → extractor hand-off
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
