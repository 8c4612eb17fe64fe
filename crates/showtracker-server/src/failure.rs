use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use showtracker_auth::AuthError;
use showtracker_catalog::CatalogError;
use showtracker_core::AppError;
use showtracker_store::{FieldErrors, StoreError};

/// Message returned for every rejected or missing bearer token
pub const TOKEN_ERROR: &str = "Errore Token";

/// Any failure a request handler can end with
///
/// Handlers return `Result<_, Failure>` and use `?` on library errors; the
/// `From` impls below translate each library's errors into one of these
/// kinds. Turning a failure into an HTTP response is left to the
/// [`Normalizer`](crate::normalizer::Normalizer).
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Expected failure built through the error taxonomy
    #[error(transparent)]
    Operational(#[from] AppError),

    /// Storage-layer schema rejection
    #[error("{0}")]
    Validation(FieldErrors),

    /// Unique index violation carrying the storage error code
    #[error("duplicate key error (code {code})")]
    DuplicateKey { code: i32, index: Option<String> },

    /// Identifier that cannot be parsed
    #[error("cast failed for value \"{value}\" at path \"{path}\"")]
    MalformedId { path: String, value: String },

    /// Anything else, including handler panics
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl Failure {
    /// Failure raised by a panicking handler
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_owned());

        Self::Unexpected(anyhow::anyhow!("handler panicked: {detail}"))
    }

    /// Status carried by the failure itself, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Operational(err) => Some(err.status()),
            _ => None,
        }
    }

    /// Message carried by the failure itself, if any
    pub fn message(&self) -> Option<String> {
        let message = match self {
            Self::Operational(err) => err.message().to_owned(),
            other => other.to_string(),
        };
        (!message.trim().is_empty()).then_some(message)
    }

    /// Only taxonomy errors are expected failures
    pub const fn is_operational(&self) -> bool {
        matches!(self, Self::Operational(err) if err.is_operational())
    }

    /// Name reported in diagnostics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Operational(err) => err.kind().name(),
            Self::Validation(_) => "ValidationError",
            Self::DuplicateKey { .. } => "DuplicateKeyError",
            Self::MalformedId { .. } => "CastError",
            Self::Unexpected(_) => "Error",
        }
    }

    /// Human readable trace for diagnostics and logs
    pub fn stack(&self) -> String {
        match self {
            Self::Operational(err) => err.stack(),
            // the debug form of anyhow includes the cause chain and backtrace
            Self::Unexpected(err) => format!("{}: {err:?}", self.name()),
            other => format!("{}: {other}", other.name()),
        }
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => Self::Validation(errors),
            StoreError::DuplicateKey { code, index } => Self::DuplicateKey {
                code,
                index: Some(index),
            },
            StoreError::Cast { path, value } => Self::MalformedId { path, value },
        }
    }
}

impl From<CatalogError> for Failure {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { context } => Self::Operational(AppError::not_found(context)),
            other => Self::Operational(AppError::generic(other.context())),
        }
    }
}

impl From<AuthError> for Failure {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Malformed(_)
            | AuthError::Invalid(_)
            | AuthError::Expired
            | AuthError::WrongAudience
            | AuthError::WrongTokenKind => {
                Self::Operational(AppError::with_status(StatusCode::UNAUTHORIZED, TOKEN_ERROR))
            }
            AuthError::Signing(_) | AuthError::Hashing(_) => Self::Unexpected(err.into()),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(err)
    }
}

impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for Failure {
    fn from(rejection: QueryRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for Failure {
    fn from(rejection: PathRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

/// Extractor rejections keep 413 and 415; everything else is a bad request
fn rejected(status: StatusCode, message: String) -> Failure {
    let err = match status {
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::with_status(status, message),
        _ => AppError::bad_request(message),
    };
    Failure::Operational(err)
}

/// A failure waiting for the boundary layer to normalize it
#[derive(Debug, Clone)]
pub struct PendingFailure(pub Arc<Failure>);

impl IntoResponse for Failure {
    /// Placeholder 500 carrying the failure in its extensions
    ///
    /// The boundary layer swaps it for the normalized response.
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(PendingFailure(Arc::new(self)));
        response
    }
}

#[cfg(test)]
mod tests {
    use showtracker_store::DUPLICATE_KEY_CODE;

    use super::*;

    #[test]
    fn store_errors_map_to_derived_kinds() {
        let duplicate = Failure::from(StoreError::DuplicateKey {
            code: DUPLICATE_KEY_CODE,
            index: "userId_1_tmdbId_1".to_owned(),
        });
        assert!(matches!(duplicate, Failure::DuplicateKey { code: 11000, .. }));

        let cast = Failure::from(StoreError::Cast {
            path: "_id".to_owned(),
            value: "abc".to_owned(),
        });
        assert!(matches!(cast, Failure::MalformedId { .. }));
        assert_eq!(cast.name(), "CastError");
    }

    #[test]
    fn catalog_not_found_keeps_context() {
        let failure = Failure::from(CatalogError::NotFound {
            context: "Errore dettagli film",
        });
        assert_eq!(failure.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(failure.message().as_deref(), Some("Errore dettagli film"));
    }

    #[test]
    fn token_errors_are_unauthorized() {
        let failure = Failure::from(AuthError::WrongTokenKind);
        assert_eq!(failure.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(failure.message().as_deref(), Some(TOKEN_ERROR));

        let failure = Failure::from(AuthError::Hashing("boom".to_owned()));
        assert!(!failure.is_operational());
        assert_eq!(failure.status(), None);
    }

    #[test]
    fn panic_payload_is_kept() {
        let payload: Box<dyn Any + Send> = Box::new("kaboom");
        let failure = Failure::from_panic(payload.as_ref());
        assert_eq!(failure.message().as_deref(), Some("handler panicked: kaboom"));

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert!(Failure::from_panic(payload.as_ref()).to_string().contains("owned"));
    }

    #[test]
    fn into_response_stashes_failure() {
        let response = Failure::from(AppError::not_found("Film non trovato")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let pending = response.extensions().get::<PendingFailure>().unwrap();
        assert_eq!(pending.0.message().as_deref(), Some("Film non trovato"));
    }
}
