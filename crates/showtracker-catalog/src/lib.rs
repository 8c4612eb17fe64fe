#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Client for the TMDb movie and TV catalog
//!
//! List and detail endpoints are passed through as raw JSON; the detail
//! payloads used to populate the library also have typed views.

mod client;
mod error;
mod types;

pub use client::TmdbClient;
pub use error::CatalogError;
pub use types::{Genre, MovieDetails, SearchKind, TimeWindow, TrendingMediaType, TvDetails};
