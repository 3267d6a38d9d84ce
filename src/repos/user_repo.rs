/*
 * Responsibility
 * - SQLx operations for the users table
 * - Takes a PgPool, returns RepoError in a shape callers can map to AppError
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
    pub refresh_token: Option<String>,
    pub confirmed: bool,
}

pub async fn get_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, email, password, avatar, refresh_token, confirmed
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    avatar: Option<&str>,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, email, password, avatar)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, email, password, avatar, refresh_token, confirmed
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(avatar)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Store (or clear, with `None`) the refresh token held for a user.
pub async fn update_refresh_token(
    db: &PgPool,
    user_id: i64,
    token: Option<&str>,
) -> Result<(), RepoError> {
    sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn confirm_email(db: &PgPool, email: &str) -> Result<bool, RepoError> {
    let result =
        sqlx::query("UPDATE users SET confirmed = TRUE, updated_at = now() WHERE email = $1")
            .bind(email)
            .execute(db)
            .await?;

    Ok(result.rows_affected() > 0)
}
