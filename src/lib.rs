pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::services::{StoreService, TokenService};

/// Shared per-request state: the store, the token service and the loaded
/// configuration. All three are cheap to clone and read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreService,
    pub tokens: TokenService,
    pub config: Config,
}

pub fn build_router(state: AppState) -> Router {
    let max_file_size = state.config.upload.max_file_size;

    Router::new()
        // Auth routes
        .route("/api/auth/signup", post(handlers::handle_signup))
        .route("/api/auth/login", post(handlers::handle_login))
        .route("/api/auth/me", get(handlers::me))
        // Expense routes
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/api/expenses/total", post(handlers::total_amount))
        .route(
            "/api/expenses/category/:category",
            get(handlers::list_expenses_by_category),
        )
        .route(
            "/api/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Add middleware
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        // File upload limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_file_size))
        // Add state
        .with_state(state)
}
