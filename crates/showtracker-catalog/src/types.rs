use serde::{Deserialize, Serialize};

/// Which search endpoint a query goes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::EnumString, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchKind {
    /// Movies, TV shows and people in one list
    #[default]
    Multi,
    Movie,
    Tv,
}

/// Media type segment of the trending endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::EnumString, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendingMediaType {
    #[default]
    All,
    Movie,
    Tv,
    Person,
}

/// Time window segment of the trending endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::EnumString, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Movie detail fields copied into a library entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// `YYYY-MM-DD`, empty when unknown
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    pub adult: bool,
}

/// TV show detail fields copied into a library entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TvDetails {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_run_time: Vec<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    pub original_language: Option<String>,
    pub adult: bool,
    /// Production status, e.g. `"Returning Series"`
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub show_type: Option<String>,
}
