#![allow(clippy::must_use_candidate)]

//! Shared types for the ShowTracker backend
//!
//! Holds the operational error taxonomy that every feature crate uses to
//! describe expected failures. Conversion into HTTP responses lives in the
//! server crate so this crate stays free of any web framework.

mod error;

pub use error::{AppError, ErrorKind};
