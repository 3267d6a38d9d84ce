/*
 * Responsibility
 * - /contacts CRUD plus search and the upcoming-birthday window
 * - Every operation is scoped to the authenticated caller; ownership is
 *   enforced in the repo queries, not here
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::api::dto::contacts::{
    ContactPayload, ContactResponse, ContactUpdate, Pagination, SearchQuery,
};
use crate::api::extractors::CurrentUser;
use crate::error::AppError;
use crate::repos::contact_repo;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let (limit, offset) = pagination
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_string()))?;

    let rows = contact_repo::list(&state.db, user.id, limit, offset).await?;

    Ok(Json(rows.into_iter().map(ContactResponse::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<i64>,
) -> Result<Json<ContactResponse>, AppError> {
    let row = contact_repo::get(&state.db, user.id, contact_id)
        .await?
        .ok_or(AppError::NotFound("Contact not found"))?;

    Ok(Json(ContactResponse::from(row)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ContactPayload>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    payload
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_string()))?;

    let row = contact_repo::create(&state.db, user.id, &payload.as_fields()).await?;

    Ok((StatusCode::CREATED, Json(ContactResponse::from(row))))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<i64>,
    Json(payload): Json<ContactUpdate>,
) -> Result<Json<ContactResponse>, AppError> {
    payload
        .contact
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_string()))?;

    let row = contact_repo::update(
        &state.db,
        user.id,
        contact_id,
        &payload.contact.as_fields(),
        payload.deleted,
    )
    .await?
    .ok_or(AppError::NotFound("Contact not found"))?;

    Ok(Json(ContactResponse::from(row)))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    // 204 whether or not the row existed: deleting an absent contact is
    // indistinguishable from deleting it twice.
    contact_repo::delete(&state.db, user.id, contact_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn search(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    if params.query.is_empty() {
        return Err(AppError::BadRequest("query must not be empty".to_string()));
    }

    let rows = contact_repo::search(&state.db, user.id, &params.query).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("No contacts found."));
    }

    Ok(Json(rows.into_iter().map(ContactResponse::from).collect()))
}

pub async fn birthdays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let today = Utc::now().date_naive();
    let rows = contact_repo::upcoming_birthdays(&state.db, user.id, today).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("No birthdays in the next 7 days."));
    }

    Ok(Json(rows.into_iter().map(ContactResponse::from).collect()))
}
