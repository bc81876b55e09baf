use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::json;

use crate::errors::{AppError, AppResult};
use crate::models::{LoginForm, LoginResponse, MemberResponse, Principal, RegisterForm, RoleType};
use crate::AppState;

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> AppResult<Response> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(
            "username and password must not be empty".into(),
        ));
    }
    if form.password != form.confirm_password {
        return Err(AppError::Validation("passwords don't match".into()));
    }
    if state.store.find_member(username).await?.is_some() {
        return Err(AppError::Validation("username is already taken".into()));
    }

    let password_hash = hash(form.password.as_bytes(), DEFAULT_COST)?;
    let member = state
        .store
        .create_member(username, &password_hash, RoleType::User)
        .await?;

    tracing::info!("registered new member: {}", member.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "member registered successfully" })),
    )
        .into_response())
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> AppResult<Response> {
    tracing::debug!("login attempt for {}", form.username);

    // Unknown username and wrong password produce the same rejection.
    let member = state
        .store
        .find_member(&form.username)
        .await?
        .ok_or_else(|| AppError::Authentication("bad credentials".into()))?;

    if !verify(form.password.as_bytes(), &member.password_hash)? {
        return Err(AppError::Authentication("bad credentials".into()));
    }

    let token = state.tokens.issue(&Principal::from(&member))?;
    tracing::info!("issued token for {}", member.username);

    Ok(Json(LoginResponse {
        username: member.username,
        token,
    })
    .into_response())
}

pub async fn me(Extension(principal): Extension<Principal>) -> AppResult<Response> {
    Ok(Json(MemberResponse {
        id: principal.id,
        username: principal.username,
        role: principal.role,
    })
    .into_response())
}
