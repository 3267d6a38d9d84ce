/*
 * Responsibility
 * - /auth account lifecycle: signup, login, token refresh, email confirmation
 * - DTO validation first, then repo/service calls; password work runs under
 *   spawn_blocking; confirmation mail goes out on a spawned task
 */
use axum::{
    Form, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use tracing::warn;

use crate::api::dto::users::{
    LoginForm, MessageResponse, RequestEmail, SignupRequest, TokenResponse, UserResponse,
};
use crate::error::AppError;
use crate::middleware::auth::bearer_token;
use crate::repos::user_repo::{self, UserRow};
use crate::services::auth::TokenScope;
use crate::services::gravatar::gravatar_url;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(|m| AppError::BadRequest(m.to_string()))?;

    if user_repo::get_by_email(&state.db, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Account already exists"));
    }

    let hasher = state.hasher.clone();
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|_| AppError::Internal)?
        .map_err(|err| {
            tracing::error!(error = %err, "password hashing failed");
            AppError::Internal
        })?;

    let avatar = gravatar_url(&req.email);
    let user = user_repo::create(
        &state.db,
        req.username.trim(),
        &req.email,
        &password_hash,
        Some(&avatar),
    )
    .await?;

    spawn_confirmation_email(&state, &user);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = user_repo::get_by_email(&state.db, &form.username)
        .await?
        .ok_or(AppError::Unauthorized("Invalid email"))?;

    if !user.confirmed {
        return Err(AppError::Unauthorized("Email not confirmed"));
    }

    let hasher = state.hasher.clone();
    let stored = user.password.clone();
    let password = form.password;
    let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
        .await
        .map_err(|_| AppError::Internal)?
        .map_err(|err| {
            tracing::error!(error = %err, "stored password hash is unreadable");
            AppError::Internal
        })?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid password"));
    }

    issue_token_pair(&state, &user).await
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let token =
        bearer_token(&headers).ok_or(AppError::Unauthorized("Could not validate credentials"))?;

    let email = state
        .tokens
        .verify(token, TokenScope::Refresh)
        .map_err(|err| {
            warn!(error = %err, "refresh token verification failed");
            AppError::Unauthorized("Invalid refresh token")
        })?;

    let user = user_repo::get_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::Unauthorized("Invalid refresh token"))?;

    // A presented token that verifies but is not the one on file means the
    // stored token leaked or was rotated away; drop it and force a login.
    if user.refresh_token.as_deref() != Some(token) {
        user_repo::update_refresh_token(&state.db, user.id, None).await?;
        return Err(AppError::Unauthorized("Invalid refresh token"));
    }

    issue_token_pair(&state, &user).await
}

pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = state
        .tokens
        .verify(&token, TokenScope::Email)
        .map_err(|_| AppError::BadRequest("Verification error".to_string()))?;

    let user = user_repo::get_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::BadRequest("Verification error".to_string()))?;

    if user.confirmed {
        return Ok(Json(MessageResponse {
            message: "Your email is already confirmed",
        }));
    }

    user_repo::confirm_email(&state.db, &email).await?;

    Ok(Json(MessageResponse {
        message: "Email confirmed",
    }))
}

pub async fn request_email(
    State(state): State<AppState>,
    Json(req): Json<RequestEmail>,
) -> Result<Json<MessageResponse>, AppError> {
    match user_repo::get_by_email(&state.db, &req.email).await? {
        Some(user) if user.confirmed => Ok(Json(MessageResponse {
            message: "Your email is already confirmed",
        })),
        Some(user) => {
            spawn_confirmation_email(&state, &user);
            Ok(Json(MessageResponse {
                message: "Check your email for confirmation.",
            }))
        }
        // Same answer for unknown addresses: no account probing.
        None => Ok(Json(MessageResponse {
            message: "Check your email for confirmation.",
        })),
    }
}

async fn issue_token_pair(state: &AppState, user: &UserRow) -> Result<Json<TokenResponse>, AppError> {
    let access_token = state.tokens.issue(&user.email, TokenScope::Access)?;
    let refresh_token = state.tokens.issue(&user.email, TokenScope::Refresh)?;

    user_repo::update_refresh_token(&state.db, user.id, Some(&refresh_token)).await?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
    }))
}

/// Issue an email token and send the confirmation mail without blocking the
/// response; a failed send only leaves a warning in the logs.
fn spawn_confirmation_email(state: &AppState, user: &UserRow) {
    let token = match state.tokens.issue(&user.email, TokenScope::Email) {
        Ok(token) => token,
        Err(_) => {
            warn!(email = %user.email, "could not issue email confirmation token");
            return;
        }
    };

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    let username = user.username.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_confirmation(&email, &username, &token).await {
            warn!(error = %err, to = %email, "failed to send confirmation email");
        }
    });
}
