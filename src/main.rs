use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;

use axum_expense::config::Config;
use axum_expense::services::{StoreService, TokenService};
use axum_expense::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Connect and migrate the database
    let pool = SqlitePoolOptions::new()
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    // The signing key is read once here and immutable afterwards
    let tokens = TokenService::from_config(&config.auth)?;

    tokio::fs::create_dir_all(&config.upload.upload_dir)
        .await
        .context("failed to create upload directory")?;

    let state = AppState {
        store: StoreService::new(pool),
        tokens,
        config: config.clone(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("failed to bind server")?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}
