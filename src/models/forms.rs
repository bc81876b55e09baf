use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::expense::{Category, Expense, Photo};
use super::member::RoleType;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: i64,
    pub username: String,
    pub role: RoleType,
}

/// JSON payload carried in the `expense` part of the multipart
/// create/update requests.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExpenseForm {
    pub title: String,
    pub content: String,
    pub amount: f64,
    pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub amount: f64,
    pub category: Category,
    pub member_id: i64,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseResponse {
    pub fn from_parts(expense: Expense, photos: Vec<Photo>) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            content: expense.content,
            amount: expense.amount,
            category: expense.category,
            member_id: expense.member_id,
            photo_urls: photos.into_iter().map(|p| p.file_path).collect(),
            created_at: expense.created_at,
        }
    }
}

/// One line of the server-side total calculation.
#[derive(Debug, Deserialize)]
pub struct AmountDto {
    pub amount: f64,
}

fn default_page() -> u32 {
    0
}

fn default_size() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, params: &PageParams, total_elements: i64) -> Self {
        let size = params.size.max(1);
        Self {
            content,
            page: params.page,
            size,
            total_elements,
            total_pages: (total_elements + i64::from(size) - 1) / i64::from(size),
        }
    }
}
