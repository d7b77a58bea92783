use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::CheckIn;
use crate::error::ApiError;

pub const NOTES_MAX: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateCheckInRequest {
    pub habit_id: Uuid,
    #[serde(default = "default_completed")]
    pub completed: bool,
    pub notes: Option<String>,
}

fn default_completed() -> bool {
    true
}

impl CreateCheckInRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        if let Some(n) = self.notes.as_mut() {
            *n = n.trim().to_string();
            if n.chars().count() > NOTES_MAX {
                return Err(ApiError::Validation {
                    field: "notes",
                    message: "notes must be at most 500 characters",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_page_limit() -> i64 {
    30
}

impl PageQuery {
    /// 1-based page and a bounded limit, tolerant of garbage input.
    pub fn normalized(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, 100))
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct CheckInPage {
    pub check_ins: Vec<CheckIn>,
    pub pagination: Pagination,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(current: i64, limit: i64, total: i64) -> Self {
        Self {
            current,
            pages: (total + limit - 1) / limit,
            total,
        }
    }
}
