use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Category {
    Food,
    Transport,
    Lodging,
    Event,
    Other,
}

/// An expense record. Owned by exactly one member; `created_at` is set on
/// insert and never updated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub amount: f64,
    pub category: Category,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A photo attachment belonging to an expense. Ordered by insertion.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Photo {
    pub id: i64,
    pub expense_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
}

/// An uploaded file already written to the upload directory, ready to be
/// recorded as a `Photo` row.
#[derive(Debug, Clone)]
pub struct SavedPhoto {
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: i64,
}
