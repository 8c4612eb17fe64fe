use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Genre, average_rating, check_max_chars, check_rating, trim_in_place, trim_optional};
use crate::{Document, FieldErrors, RecordId, StoreError};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::AsRefStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovieStatus {
    #[default]
    ToWatch,
    Watched,
    Watching,
}

/// A movie in a user's library
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tmdb_id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    pub adult: bool,

    pub user_id: RecordId,
    pub status: MovieStatus,
    pub user_rating: Option<f64>,
    pub user_comment: Option<String>,
    pub watched_at: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
    pub lists: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Empty library entry; catalog metadata is filled in by the caller
    pub fn new(user_id: RecordId, tmdb_id: u64, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            tmdb_id,
            title: title.into(),
            original_title: None,
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            runtime: None,
            genres: Vec::new(),
            vote_average: None,
            vote_count: None,
            popularity: None,
            original_language: None,
            adult: false,
            user_id,
            status: MovieStatus::default(),
            user_rating: None,
            user_comment: None,
            watched_at: None,
            added_at: now,
            lists: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Movie {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn normalize(&mut self) {
        trim_in_place(&mut self.title);
        trim_optional(&mut self.original_title);
        trim_optional(&mut self.overview);
        trim_optional(&mut self.user_comment);
        self.lists.iter_mut().for_each(trim_in_place);
    }

    fn validate(&self) -> Result<(), StoreError> {
        let mut errors = FieldErrors::new();

        if self.tmdb_id == 0 {
            errors.add("tmdbId", "TMDb ID obbligatorio");
        }
        if self.title.is_empty() {
            errors.add("title", "titolo obbligatorio");
        }
        check_max_chars(&mut errors, "title", Some(&self.title), 200, "max 200 caratteri");
        check_max_chars(&mut errors, "overview", self.overview.as_deref(), 2000, "max 2000 caratteri");
        check_rating(&mut errors, self.user_rating);
        check_max_chars(&mut errors, "userComment", self.user_comment.as_deref(), 1000, "max 1000 caratteri");

        errors.into_result()
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("userId_1_tmdbId_1", format!("{}:{}", self.user_id, self.tmdb_id))]
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.added_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// User-editable fields of a library movie
///
/// Used both for the extra fields of an add request and for partial
/// updates. Nullable fields distinguish "absent" from an explicit `null`,
/// which clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
    pub status: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub user_rating: Option<Option<f64>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub user_comment: Option<Option<String>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub watched_at: Option<Option<DateTime<Utc>>>,
    pub lists: Option<Vec<String>>,
}

impl MoviePatch {
    /// Copy the present fields onto `movie`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when `status` is not a known value
    pub fn apply(self, movie: &mut Movie) -> Result<(), StoreError> {
        if let Some(status) = self.status {
            movie.status = MovieStatus::from_str(&status).map_err(|_| {
                let mut errors = FieldErrors::new();
                errors.add("status", format!("`{status}` is not a valid enum value for path `status`."));
                StoreError::Validation(errors)
            })?;
        }
        if let Some(rating) = self.user_rating {
            movie.user_rating = rating;
        }
        if let Some(comment) = self.user_comment {
            movie.user_comment = comment;
        }
        if let Some(watched_at) = self.watched_at {
            movie.watched_at = watched_at;
        }
        if let Some(lists) = self.lists {
            movie.lists = lists;
        }
        Ok(())
    }
}

/// Per-user movie library summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieStats {
    pub total_movies: u64,
    pub watched_movies: u64,
    pub to_watch_movies: u64,
    pub average_rating: Option<f64>,
}

impl MovieStats {
    pub fn from_movies(movies: &[Movie]) -> Self {
        let count = |status: MovieStatus| movies.iter().filter(|m| m.status == status).count() as u64;
        Self {
            total_movies: movies.len() as u64,
            watched_movies: count(MovieStatus::Watched),
            to_watch_movies: count(MovieStatus::ToWatch),
            average_rating: average_rating(movies.iter().map(|m| m.user_rating)),
        }
    }
}
