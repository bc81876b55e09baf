use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, AppResult};
use crate::models::Principal;
use crate::AppState;

/// Routes reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/api/auth/login", "/api/auth/signup"];

/// Bearer-token authentication.
///
/// Validates the token, resolves the subject to a member row and injects a
/// `Principal` extension for the handlers. The role comes from the database
/// on every request, so a demoted admin loses access without waiting for
/// token expiry; the roles claim inside the token is diagnostic only.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let path = req.uri().path();
    if PUBLIC_PATHS.contains(&path) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Authentication("missing bearer token".into()))?;

    let claims = state.tokens.validate(token)?;

    let member = state
        .store
        .find_member(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Authentication(format!("unknown subject '{}'", claims.sub)))?;

    tracing::debug!("authenticated {} as {}", member.username, member.role.as_str());
    req.extensions_mut().insert(Principal::from(&member));
    Ok(next.run(req).await)
}
