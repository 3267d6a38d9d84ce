/*
 * Responsibility
 * - Contact request/response DTOs and the list-query parameters
 * - Field limits mirror the storage schema (50/100/100/13 chars, past date)
 */
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::users::looks_like_email;
use crate::repos::contact_repo::{ContactFields, ContactRow};

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Example: "012 234 56 78"
    pub phone: String,
    pub born_date: NaiveDate,
}

impl ContactPayload {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_name.trim().is_empty() {
            return Err("first_name is required");
        }
        if self.first_name.len() > 50 {
            return Err("first_name must be <= 50 chars");
        }
        if self.last_name.len() > 100 {
            return Err("last_name must be <= 100 chars");
        }
        if self.email.len() > 100 || !looks_like_email(&self.email) {
            return Err("email is not a valid address");
        }
        if self.phone.is_empty() || self.phone.len() > 13 {
            return Err("phone must be 1..=13 chars");
        }
        if self.born_date >= Utc::now().date_naive() {
            return Err("born_date must be in the past");
        }
        Ok(())
    }

    pub fn as_fields(&self) -> ContactFields<'_> {
        ContactFields {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            phone: &self.phone,
            born_date: self.born_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactUpdate {
    #[serde(flatten)]
    pub contact: ContactPayload,
    /// Soft-delete flag; stored, never filtered on.
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Returns (limit, offset). Limit is 10..=500 (default 10), offset >= 0.
    pub fn validate(&self) -> Result<(i64, i64), &'static str> {
        let limit = self.limit.unwrap_or(10);
        if !(10..=500).contains(&limit) {
            return Err("limit must be within 10..=500");
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err("offset must be >= 0");
        }
        Ok((limit, offset))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub born_date: NaiveDate,
}

impl From<ContactRow> for ContactResponse {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            born_date: row.born_date,
        }
    }
}
