use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

use http::StatusCode;

/// Classified kinds of expected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unclassified but expected failure
    Generic,
    /// Caller input fails a precondition
    BadRequest,
    /// Referenced resource is absent
    NotFound,
}

impl ErrorKind {
    /// Status code used when none is given explicitly
    pub const fn default_status(self) -> StatusCode {
        match self {
            Self::Generic => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message used when none is given explicitly
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Generic => "Internal server error",
            Self::BadRequest => "Bad request",
            Self::NotFound => "Resource not found",
        }
    }

    /// Name reported in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "AppError",
            Self::BadRequest => "BadRequestError",
            Self::NotFound => "NotFoundError",
        }
    }
}

/// An expected, classified failure raised by business logic
///
/// Built at the point a precondition fails and consumed once by the error
/// normalizer. The value is immutable: there are no setters, only
/// constructors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    status: StatusCode,
    message: String,
    trace: Arc<Backtrace>,
}

impl AppError {
    /// Create an error of `kind` with its default status and message
    pub fn new(kind: ErrorKind) -> Self {
        Self::build(kind, kind.default_status(), None)
    }

    /// Generic operational error (500)
    pub fn generic(message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Generic, ErrorKind::Generic.default_status(), Some(message.into()))
    }

    /// Generic operational error with an explicit status code
    ///
    /// Only the generic kind accepts a status override; the named kinds
    /// always carry their own status.
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Generic, status, Some(message.into()))
    }

    /// Caller input fails a precondition (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::build(ErrorKind::BadRequest, ErrorKind::BadRequest.default_status(), Some(message.into()))
    }

    /// Referenced resource is absent (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::build(ErrorKind::NotFound, ErrorKind::NotFound.default_status(), Some(message.into()))
    }

    fn build(kind: ErrorKind, status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_owned());

        Self {
            kind,
            status,
            message,
            trace: Arc::new(Backtrace::capture()),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Always true: every taxonomy error is an expected failure
    pub const fn is_operational(&self) -> bool {
        true
    }

    /// Human readable trace: `Name: message` followed by the captured
    /// backtrace when backtraces are enabled for the process
    pub fn stack(&self) -> String {
        let head = format!("{}: {}", self.kind.name(), self.message);
        match self.trace.status() {
            BacktraceStatus::Captured => format!("{head}\n{}", self.trace),
            _ => head,
        }
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
