//! In-memory document store for users and their libraries
//!
//! Documents are validated on every write and unique indexes are checked
//! under the collection's write lock. Failures use the same signals a
//! document database would report: per-field validation messages, the
//! `11000` duplicate key code and identifier cast errors.

#![allow(clippy::must_use_candidate)]

mod collection;
mod error;
mod id;
mod models;

pub use collection::{Collection, Document};
pub use error::{DUPLICATE_KEY_CODE, FieldErrors, StoreError};
pub use id::RecordId;
pub use models::{
    Genre, Movie, MoviePatch, MovieStats, MovieStatus, NewUser, Series, SeriesPatch, SeriesStats, User, WatchStatus,
};

/// All collections of the application
pub struct Store {
    pub users: Collection<User>,
    pub movies: Collection<Movie>,
    pub series: Collection<Series>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Collection::new("users"),
            movies: Collection::new("movies"),
            series: Collection::new("series"),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
