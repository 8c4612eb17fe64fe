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
pub enum WatchStatus {
    #[default]
    ToWatch,
    Watching,
    Completed,
    Dropped,
}

/// A TV show in a user's library
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tmdb_id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub last_air_date: Option<NaiveDate>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_run_time: Vec<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    pub adult: bool,
    /// Production status reported by the catalog, e.g. `"Ended"`
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub show_type: Option<String>,

    pub user_id: RecordId,
    pub watch_status: WatchStatus,
    pub user_rating: Option<f64>,
    pub user_comment: Option<String>,
    pub current_season: i64,
    pub current_episode: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
    pub lists: Vec<String>,
    /// Estimated percentage watched, refreshed on every write
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Series {
    /// Empty library entry; catalog metadata is filled in by the caller
    pub fn new(user_id: RecordId, tmdb_id: u64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            tmdb_id,
            name: name.into(),
            original_name: None,
            overview: None,
            poster_path: None,
            backdrop_path: None,
            first_air_date: None,
            last_air_date: None,
            number_of_seasons: None,
            number_of_episodes: None,
            episode_run_time: Vec::new(),
            genres: Vec::new(),
            vote_average: None,
            vote_count: None,
            popularity: None,
            original_language: None,
            adult: false,
            status: None,
            show_type: None,
            user_id,
            watch_status: WatchStatus::default(),
            user_rating: None,
            user_comment: None,
            current_season: 1,
            current_episode: 1,
            started_at: None,
            completed_at: None,
            added_at: now,
            lists: Vec::new(),
            progress: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Estimated percentage of episodes watched
    ///
    /// Assumes episodes are spread evenly across seasons. Zero when the
    /// catalog gave no episode or season counts.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn compute_progress(&self) -> u8 {
        let (Some(episodes), Some(seasons)) = (self.number_of_episodes, self.number_of_seasons) else {
            return 0;
        };
        if episodes == 0 || seasons == 0 || self.current_season < 1 || self.current_episode < 1 {
            return 0;
        }

        let episodes = f64::from(episodes);
        let per_season = episodes / f64::from(seasons);
        let estimated = (self.current_season - 1) as f64 * per_season + self.current_episode as f64;

        (estimated / episodes * 100.0).round().min(100.0) as u8
    }
}

impl Document for Series {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn normalize(&mut self) {
        trim_in_place(&mut self.name);
        trim_optional(&mut self.original_name);
        trim_optional(&mut self.overview);
        trim_optional(&mut self.user_comment);
        self.lists.iter_mut().for_each(trim_in_place);
        self.progress = self.compute_progress();
    }

    fn validate(&self) -> Result<(), StoreError> {
        let mut errors = FieldErrors::new();

        if self.tmdb_id == 0 {
            errors.add("tmdbId", "TMDb ID obbligatorio");
        }
        if self.name.is_empty() {
            errors.add("name", "nome obbligatorio");
        }
        check_max_chars(&mut errors, "name", Some(&self.name), 200, "nome max 200 caratteri");
        check_max_chars(&mut errors, "overview", self.overview.as_deref(), 2000, "trama 2000 caratteri");
        check_rating(&mut errors, self.user_rating);
        check_max_chars(
            &mut errors,
            "userComment",
            self.user_comment.as_deref(),
            1000,
            "commento max 1000 caratteri",
        );
        for (path, value) in [("currentSeason", self.current_season), ("currentEpisode", self.current_episode)] {
            if value < 1 {
                errors.add(path, format!("Path `{path}` ({value}) is less than minimum allowed value (1)."));
            }
        }

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

/// User-editable fields of a library series
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPatch {
    pub watch_status: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub user_rating: Option<Option<f64>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub user_comment: Option<Option<String>>,
    pub current_season: Option<i64>,
    pub current_episode: Option<i64>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub started_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "serde_with::rust::double_option")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub lists: Option<Vec<String>>,
}

impl SeriesPatch {
    /// Copy the present fields onto `series`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when `watchStatus` is not a known
    /// value
    pub fn apply(self, series: &mut Series) -> Result<(), StoreError> {
        if let Some(status) = self.watch_status {
            series.watch_status = WatchStatus::from_str(&status).map_err(|_| {
                let mut errors = FieldErrors::new();
                errors.add(
                    "watchStatus",
                    format!("`{status}` is not a valid enum value for path `watchStatus`."),
                );
                StoreError::Validation(errors)
            })?;
        }
        if let Some(rating) = self.user_rating {
            series.user_rating = rating;
        }
        if let Some(comment) = self.user_comment {
            series.user_comment = comment;
        }
        if let Some(season) = self.current_season {
            series.current_season = season;
        }
        if let Some(episode) = self.current_episode {
            series.current_episode = episode;
        }
        if let Some(started_at) = self.started_at {
            series.started_at = started_at;
        }
        if let Some(completed_at) = self.completed_at {
            series.completed_at = completed_at;
        }
        if let Some(lists) = self.lists {
            series.lists = lists;
        }
        Ok(())
    }
}

/// Per-user series library summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub total_series: u64,
    pub watching_series: u64,
    pub completed_series: u64,
    pub to_watch_series: u64,
    pub average_rating: Option<f64>,
}

impl SeriesStats {
    pub fn from_series(series: &[Series]) -> Self {
        let count = |status: WatchStatus| series.iter().filter(|s| s.watch_status == status).count() as u64;
        Self {
            total_series: series.len() as u64,
            watching_series: count(WatchStatus::Watching),
            completed_series: count(WatchStatus::Completed),
            to_watch_series: count(WatchStatus::ToWatch),
            average_rating: average_rating(series.iter().map(|s| s.user_rating)),
        }
    }
}
