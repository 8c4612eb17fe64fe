use axum::body::Body;
use axum::response::Response;
use http::{HeaderValue, StatusCode, header};
use serde::Serialize;
use showtracker_config::Environment;

use crate::failure::Failure;

const FALLBACK_MESSAGE: &str = "Internal server error";
const DUPLICATE_MESSAGE: &str = "Resource already exists";
const MALFORMED_ID_MESSAGE: &str = "Invalid identifier";

/// Minimal body used when the diagnostic payload cannot be serialized
const MINIMAL_BODY: &[u8] = br#"{"status":"error","message":"Internal server error"}"#;

/// Turns any [`Failure`] into the uniform error response
///
/// Flags are fixed at startup from the configured environment and never
/// re-read per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    diagnostics: bool,
    log_failures: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

impl Normalizer {
    pub const fn new(diagnostics: bool, log_failures: bool) -> Self {
        Self {
            diagnostics,
            log_failures,
        }
    }

    pub const fn for_environment(environment: Environment) -> Self {
        Self::new(environment.diagnostics_enabled(), environment.log_failures())
    }

    /// Status and message for `failure`
    ///
    /// Starts from what the failure carries, then applies the storage rules
    /// in a fixed order: validation, duplicate key, malformed identifier.
    pub fn classify(failure: &Failure) -> (StatusCode, String) {
        let mut status = failure.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut message = failure.message().unwrap_or_else(|| FALLBACK_MESSAGE.to_owned());

        if let Failure::Validation(errors) = failure {
            status = StatusCode::BAD_REQUEST;
            message = errors.messages().collect::<Vec<_>>().join(", ");
            if message.trim().is_empty() {
                FALLBACK_MESSAGE.clone_into(&mut message);
            }
        }

        if let Failure::DuplicateKey { code, .. } = failure
            && *code == showtracker_store::DUPLICATE_KEY_CODE
        {
            status = StatusCode::CONFLICT;
            message = DUPLICATE_MESSAGE.to_owned();
        }

        if let Failure::MalformedId { .. } = failure {
            status = StatusCode::BAD_REQUEST;
            message = MALFORMED_ID_MESSAGE.to_owned();
        }

        (status, message)
    }

    /// Serialized response body and its status
    ///
    /// Pure: the same failure always renders to the same bytes.
    pub fn render(&self, failure: &Failure) -> (StatusCode, Vec<u8>) {
        let (status, message) = Self::classify(failure);

        let body = ErrorBody {
            status: "error",
            message: &message,
            stack: self.diagnostics.then(|| failure.stack()),
            error: self.diagnostics.then(|| failure.name()),
        };

        let bytes = serde_json::to_vec(&body).or_else(|_| {
            serde_json::to_vec(&ErrorBody {
                status: "error",
                message: &message,
                stack: None,
                error: None,
            })
        });

        (status, bytes.unwrap_or_else(|_| MINIMAL_BODY.to_vec()))
    }

    /// Log the failure when enabled and build the response
    pub fn respond(&self, failure: &Failure) -> Response {
        let (status, body) = self.render(failure);

        if self.log_failures {
            log_failure(failure, status);
        }

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

fn log_failure(failure: &Failure, status: StatusCode) {
    let message = failure.message().unwrap_or_default();
    let stack = failure.stack();
    let operational = failure.is_operational();

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), detail = %message, stack = %stack, operational, "request failed");
    } else {
        tracing::warn!(status = status.as_u16(), detail = %message, stack = %stack, operational, "request failed");
    }
}
