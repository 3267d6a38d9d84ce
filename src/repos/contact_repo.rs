/*
 * Responsibility
 * - SQLx operations for the contacts table, always scoped to one owner
 * - Search (ILIKE over names/email) and the upcoming-birthday window
 */
use chrono::{Datelike, NaiveDate};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub born_date: NaiveDate,
    pub deleted: bool,
}

/// Field set shared by create and update.
#[derive(Debug)]
pub struct ContactFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub born_date: NaiveDate,
}

pub async fn list(
    db: &PgPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ContactRow>, RepoError> {
    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT id, first_name, last_name, email, phone, born_date, deleted
        FROM contacts
        WHERE user_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(
    db: &PgPool,
    user_id: i64,
    contact_id: i64,
) -> Result<Option<ContactRow>, RepoError> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT id, first_name, last_name, email, phone, born_date, deleted
        FROM contacts
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(contact_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    user_id: i64,
    fields: &ContactFields<'_>,
) -> Result<ContactRow, RepoError> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts (first_name, last_name, email, phone, born_date, user_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, first_name, last_name, email, phone, born_date, deleted
        "#,
    )
    .bind(fields.first_name)
    .bind(fields.last_name)
    .bind(fields.email)
    .bind(fields.phone)
    .bind(fields.born_date)
    .bind(user_id)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    user_id: i64,
    contact_id: i64,
    fields: &ContactFields<'_>,
    deleted: bool,
) -> Result<Option<ContactRow>, RepoError> {
    let row = sqlx::query_as::<_, ContactRow>(
        r#"
        UPDATE contacts
        SET first_name = $3,
            last_name = $4,
            email = $5,
            phone = $6,
            born_date = $7,
            deleted = $8,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, first_name, last_name, email, phone, born_date, deleted
        "#,
    )
    .bind(contact_id)
    .bind(user_id)
    .bind(fields.first_name)
    .bind(fields.last_name)
    .bind(fields.email)
    .bind(fields.phone)
    .bind(fields.born_date)
    .bind(deleted)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn delete(db: &PgPool, user_id: i64, contact_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
        .bind(contact_id)
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn search(
    db: &PgPool,
    user_id: i64,
    query: &str,
) -> Result<Vec<ContactRow>, RepoError> {
    let pattern = format!("%{}%", query);

    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT id, first_name, last_name, email, phone, born_date, deleted
        FROM contacts
        WHERE user_id = $1
          AND (first_name ILIKE $2 OR last_name ILIKE $2 OR email ILIKE $2)
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .bind(pattern)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Contacts whose birthday (month/day) lands within the next 7 days.
///
/// Matching is year-agnostic: the stored birth year is irrelevant, only the
/// month/day is compared, so the window is computed as a set of MMDD keys
/// (which also handles the year-end wrap).
pub async fn upcoming_birthdays(
    db: &PgPool,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<ContactRow>, RepoError> {
    let window = birthday_window(today);

    let rows = sqlx::query_as::<_, ContactRow>(
        r#"
        SELECT id, first_name, last_name, email, phone, born_date, deleted
        FROM contacts
        WHERE user_id = $1
          AND to_char(born_date, 'MMDD') = ANY($2)
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .bind(window)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// MMDD keys for `today` through `today + 7` inclusive.
///
/// In a non-leap year the window never visits Feb 29, so contacts born on a
/// leap day would be skipped; when the window crosses from February into
/// March, `0229` is added so those birthdays surface on Feb 28/Mar 1.
fn birthday_window(today: NaiveDate) -> Vec<String> {
    let mut keys = Vec::with_capacity(9);
    let mut day = today;
    for _ in 0..=7 {
        keys.push(format!("{:02}{:02}", day.month(), day.day()));
        if day.month() == 2 && day.day() == 28 && !day.leap_year() {
            keys.push("0229".to_string());
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_covers_eight_inclusive_days() {
        let keys = birthday_window(date(2024, 3, 10));
        assert_eq!(
            keys,
            vec!["0310", "0311", "0312", "0313", "0314", "0315", "0316", "0317"]
        );
    }

    #[test]
    fn window_wraps_over_new_year() {
        let keys = birthday_window(date(2023, 12, 28));
        assert!(keys.contains(&"1231".to_string()));
        assert!(keys.contains(&"0101".to_string()));
        assert!(keys.contains(&"0104".to_string()));
    }

    #[test]
    fn window_handles_leap_february() {
        let keys = birthday_window(date(2024, 2, 26));
        assert!(keys.contains(&"0229".to_string()));
        assert!(keys.contains(&"0301".to_string()));
    }

    #[test]
    fn leap_day_birthdays_surface_in_non_leap_years() {
        let keys = birthday_window(date(2023, 2, 24));
        assert!(keys.contains(&"0228".to_string()));
        assert!(keys.contains(&"0229".to_string()));
        assert!(keys.contains(&"0303".to_string()));

        // Away from the Feb/Mar boundary the synthetic key does not appear.
        let keys = birthday_window(date(2023, 6, 1));
        assert!(!keys.contains(&"0229".to_string()));
    }
}
