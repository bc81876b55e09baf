use thiserror::Error;

// Make the response module public
pub mod response;

use crate::services::TokenError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Bad credentials at login, or a request whose bearer token resolves
    /// to no known member.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Token rejected by the token service; the inner variant says why.
    #[error("invalid token: {0}")]
    Token(#[from] TokenError),

    /// Authenticated but not allowed to touch this record.
    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("file error: {0}")]
    File(#[from] std::io::Error),

    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token issuance failed: {0}")]
    TokenIssuance(#[from] jsonwebtoken::errors::Error),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
