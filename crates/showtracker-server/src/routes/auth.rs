use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use showtracker_auth::TokenKind;
use showtracker_core::AppError;
use showtracker_store::{NewUser, User};

use crate::extract::ApiJson;
use crate::failure::Failure;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    /// Username or email
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, Failure> {
    let (Some(username), Some(email), Some(password)) =
        (present(request.username), present(request.email), present(request.password))
    else {
        return Err(AppError::bad_request("Username, email e password sono obbligatori").into());
    };

    let mut new_user = NewUser {
        username,
        email,
        password,
        first_name: request.first_name,
        last_name: request.last_name,
    };
    new_user.normalize();

    let taken = state
        .store
        .users
        .find_one(|u| u.username == new_user.username || u.email == new_user.email)
        .await;
    if let Some(existing) = taken {
        let field = if existing.username == new_user.username { "Username" } else { "Email" };
        return Err(AppError::with_status(StatusCode::CONFLICT, format!("{field} già in uso")).into());
    }

    new_user.validate()?;
    let hash = state.passwords.hash(&new_user.password).await?;
    let user = state.store.users.insert(new_user.into_user(hash)).await?;

    tracing::info!(user_id = %user.id, "user registered");

    let body = session_body(&state, &user, "Registrazione completata")?;
    Ok((StatusCode::CREATED, ApiJson(body)))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, Failure> {
    let (Some(login), Some(password)) = (present(request.username), present(request.password)) else {
        return Err(AppError::bad_request("Username e password sono obbligatori").into());
    };
    let login = login.trim().to_owned();

    let invalid = || AppError::with_status(StatusCode::UNAUTHORIZED, "Credenziali non valide");

    let user = state
        .store
        .users
        .find_one(|u| u.matches_login(&login))
        .await
        .ok_or_else(invalid)?;

    if !state.passwords.verify(&password, &user.password_hash).await? {
        tracing::debug!(user_id = %user.id, "wrong password");
        return Err(invalid().into());
    }

    if !user.is_active {
        return Err(AppError::with_status(StatusCode::UNAUTHORIZED, "Account disattivato").into());
    }

    Ok(ApiJson(session_body(&state, &user, "Login effettuato")?))
}

async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, Failure> {
    let Some(raw) = present(request.refresh_token) else {
        return Err(AppError::bad_request("Refresh token richiesto").into());
    };

    let invalid = || AppError::with_status(StatusCode::UNAUTHORIZED, "Refresh token non valido");

    let claims = state.tokens.verify(&raw, TokenKind::Refresh).map_err(|e| {
        tracing::debug!(error = %e, "refresh token rejected");
        invalid()
    })?;

    let user = state
        .store
        .users
        .find_by_id(&claims.user_id)
        .await
        .ok()
        .flatten()
        .filter(|u| u.is_active)
        .ok_or_else(invalid)?;

    Ok(ApiJson(json!({
        "success": true,
        "token": state.tokens.issue(user.id.as_str(), TokenKind::Access)?,
        "refreshToken": state.tokens.issue(user.id.as_str(), TokenKind::Refresh)?,
    })))
}

fn session_body(state: &AppState, user: &User, message: &str) -> Result<serde_json::Value, Failure> {
    Ok(json!({
        "success": true,
        "message": message,
        "token": state.tokens.issue(user.id.as_str(), TokenKind::Access)?,
        "refreshToken": state.tokens.issue(user.id.as_str(), TokenKind::Refresh)?,
        "user": user,
    }))
}
