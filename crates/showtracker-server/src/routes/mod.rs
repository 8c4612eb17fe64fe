mod auth;
mod catalog;
mod library;

use axum::Router;

use crate::state::AppState;

/// All `/api` routes with their authentication layers
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(catalog::router(state.clone()))
        .merge(library::router(state.clone()))
        .with_state(state)
}
