use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed
// HTTP response. Authentication and authorization bodies stay generic so a
// rejected caller learns nothing about why, or about what exists.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(_) => {
                tracing::warn!("{}", self);
                (StatusCode::UNAUTHORIZED, "unauthenticated", "authentication failed".to_string())
            }

            // The three token rejections are logged distinctly but answered
            // identically; all of them mean "unauthenticated".
            AppError::Token(e) => {
                tracing::warn!("token rejected: {}", e);
                (StatusCode::UNAUTHORIZED, "unauthenticated", "invalid or expired token".to_string())
            }

            AppError::Forbidden => {
                (StatusCode::FORBIDDEN, "forbidden", "not allowed".to_string())
            }

            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
            }

            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }

            AppError::Upload(msg) => {
                (StatusCode::BAD_REQUEST, "upload_error", msg.clone())
            }

            AppError::Database(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error".to_string())
            }

            AppError::File(e) => {
                tracing::error!("file error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error".to_string())
            }

            AppError::Hash(e) => {
                tracing::error!("bcrypt error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error".to_string())
            }

            AppError::TokenIssuance(e) => {
                tracing::error!("token issuance failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
