use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use showtracker_auth::TokenKind;
use showtracker_core::AppError;
use showtracker_store::User;

use crate::failure::{Failure, TOKEN_ERROR};
use crate::state::AppState;

/// Account resolved from a valid bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Reject requests without a valid access token for an active account
pub async fn require_user(state: AppState, mut request: Request, next: Next) -> Response {
    let token = bearer_token(&request);
    match authenticate(&state, token).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(failure) => failure.into_response(),
    }
}

/// Attach the account when a valid token is present, continue either way
pub async fn optional_user(state: AppState, mut request: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(&request)
        && let Ok(user) = authenticate(&state, Some(token)).await
    {
        request.extensions_mut().insert(CurrentUser(user));
    }
    next.run(request).await
}

async fn authenticate(state: &AppState, token: Option<String>) -> Result<User, Failure> {
    let token = token.ok_or_else(token_error)?;

    let claims = state.tokens.verify(&token, TokenKind::Access).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        token_error()
    })?;

    let user = state
        .store
        .users
        .find_by_id(&claims.user_id)
        .await
        .ok()
        .flatten()
        .filter(|u| u.is_active)
        .ok_or_else(token_error)?;

    Ok(user)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
}

fn token_error() -> Failure {
    Failure::Operational(AppError::with_status(StatusCode::UNAUTHORIZED, TOKEN_ERROR))
}
