use std::any::Any;

use axum::Router;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;

use crate::failure::{Failure, PendingFailure};
use crate::normalizer::Normalizer;

/// Wrap every route of `router` so that failures and panics end up in the
/// normalizer
///
/// Handlers keep their signature; only the failure path changes.
pub fn error_boundary(router: Router, normalizer: Normalizer) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(move |req, next| async move {
            boundary_middleware(normalizer, req, next).await
        }))
}

/// Runs the wrapped stack once; a pending failure on the response is removed
/// and normalized, any other response passes through untouched
async fn boundary_middleware(normalizer: Normalizer, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<PendingFailure>() {
        Some(PendingFailure(failure)) => normalizer.respond(&failure),
        None => response,
    }
}

#[allow(clippy::needless_pass_by_value)]
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    Failure::from_panic(payload.as_ref()).into_response()
}
