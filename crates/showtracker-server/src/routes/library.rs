use std::str::FromStr;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Router};
use chrono::NaiveDate;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use showtracker_catalog::{MovieDetails, TvDetails};
use showtracker_config::LibraryConfig;
use showtracker_core::AppError;
use showtracker_store::{
    Genre, Movie, MoviePatch, MovieStats, MovieStatus, RecordId, Series, SeriesPatch, SeriesStats, WatchStatus,
};

use crate::auth::{CurrentUser, require_user};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::failure::Failure;
use crate::state::AppState;

const MOVIE_NOT_FOUND: &str = "Film non trovato";
const SERIES_NOT_FOUND: &str = "Serie TV non trovata";

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/library/movies", post(add_movie).get(list_movies))
        .route("/api/library/movies/{id}", put(update_movie).delete(remove_movie))
        .route("/api/library/series", post(add_series).get(list_series))
        .route("/api/library/series/{id}", put(update_series).delete(remove_series))
        .route("/api/library/stats", get(stats))
        .route_layer(axum::middleware::from_fn(move |req, next| {
            let state = state.clone();
            async move { require_user(state, req, next).await }
        }))
}

/// Add request: the catalog id plus any user-editable fields
///
/// The id is accepted as a number or a numeric string; zero counts as
/// missing.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest<P> {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    tmdb_id: Option<u64>,
    #[serde(flatten)]
    fields: P,
}

impl<P> AddRequest<P> {
    fn tmdb_id(&self) -> Result<u64, Failure> {
        self.tmdb_id
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::bad_request("TMDb ID richiesto").into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// `status` for movies, `watchStatus` for series
    #[serde(alias = "watchStatus")]
    status: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct Pagination {
    page: u64,
    limit: u64,
    total: u64,
    pages: u64,
}

/// Page window for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Paging {
    page: u64,
    limit: u64,
}

impl Paging {
    /// Page defaults to 1 and limit to the configured page size; limits above
    /// the configured maximum are clamped
    fn from_query(config: &LibraryConfig, page: Option<u64>, limit: Option<u64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(config.default_page_size);

        if page == 0 || limit == 0 {
            return Err(AppError::bad_request("Parametri di paginazione non validi"));
        }

        Ok(Self {
            page,
            limit: limit.min(config.max_page_size),
        })
    }

    fn skip(self) -> usize {
        usize::try_from((self.page - 1).saturating_mul(self.limit)).unwrap_or(usize::MAX)
    }

    fn take(self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }

    const fn describe(self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            pages: total.div_ceil(self.limit),
        }
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn genres(genres: Vec<showtracker_catalog::Genre>) -> Vec<Genre> {
    genres.into_iter().map(|g| Genre { id: g.id, name: g.name }).collect()
}

fn movie_from_details(user_id: RecordId, details: MovieDetails) -> Movie {
    let mut movie = Movie::new(user_id, details.id, details.title.unwrap_or_default());
    movie.original_title = details.original_title;
    movie.overview = details.overview;
    movie.poster_path = details.poster_path;
    movie.backdrop_path = details.backdrop_path;
    movie.release_date = parse_date(details.release_date.as_deref());
    movie.runtime = details.runtime;
    movie.genres = genres(details.genres);
    movie.vote_average = details.vote_average;
    movie.vote_count = details.vote_count;
    movie.popularity = details.popularity;
    movie.original_language = details.original_language;
    movie.adult = details.adult;
    movie
}

fn series_from_details(user_id: RecordId, details: TvDetails) -> Series {
    let mut series = Series::new(user_id, details.id, details.name.unwrap_or_default());
    series.original_name = details.original_name;
    series.overview = details.overview;
    series.poster_path = details.poster_path;
    series.backdrop_path = details.backdrop_path;
    series.first_air_date = parse_date(details.first_air_date.as_deref());
    series.last_air_date = parse_date(details.last_air_date.as_deref());
    series.number_of_seasons = details.number_of_seasons;
    series.number_of_episodes = details.number_of_episodes;
    series.episode_run_time = details.episode_run_time;
    series.genres = genres(details.genres);
    series.vote_average = details.vote_average;
    series.vote_count = details.vote_count;
    series.popularity = details.popularity;
    series.original_language = details.original_language;
    series.adult = details.adult;
    series.status = details.status;
    series.show_type = details.show_type;
    series
}

async fn add_movie(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<AddRequest<MoviePatch>>,
) -> Result<impl IntoResponse, Failure> {
    let tmdb_id = request.tmdb_id()?;

    let existing = state
        .store
        .movies
        .find_one(|m| m.user_id == user.id && m.tmdb_id == tmdb_id)
        .await;
    if existing.is_some() {
        return Err(AppError::with_status(StatusCode::CONFLICT, "Film già presente nella libreria").into());
    }

    let details: MovieDetails = state.catalog.movie_details(tmdb_id).await?;
    let mut movie = movie_from_details(user.id.clone(), details);
    request.fields.apply(&mut movie)?;

    let movie = state.store.movies.insert(movie).await?;
    tracing::info!(user_id = %user.id, movie_id = %movie.id, tmdb_id, "movie added to library");

    Ok((
        StatusCode::CREATED,
        ApiJson(json!({ "success": true, "message": "Film aggiunto alla libreria", "data": movie })),
    ))
}

async fn add_series(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiJson(request): ApiJson<AddRequest<SeriesPatch>>,
) -> Result<impl IntoResponse, Failure> {
    let tmdb_id = request.tmdb_id()?;

    let existing = state
        .store
        .series
        .find_one(|s| s.user_id == user.id && s.tmdb_id == tmdb_id)
        .await;
    if existing.is_some() {
        return Err(AppError::with_status(StatusCode::CONFLICT, "Serie TV già presente nella libreria").into());
    }

    let details: TvDetails = state.catalog.tv_details(tmdb_id).await?;
    let mut series = series_from_details(user.id.clone(), details);
    request.fields.apply(&mut series)?;

    let series = state.store.series.insert(series).await?;
    tracing::info!(user_id = %user.id, series_id = %series.id, tmdb_id, "series added to library");

    Ok((
        StatusCode::CREATED,
        ApiJson(json!({ "success": true, "message": "Serie TV aggiunta alla libreria", "data": series })),
    ))
}

async fn list_movies(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, Failure> {
    let paging = Paging::from_query(&state.library, query.page, query.limit)?;

    // an unknown status matches nothing
    let status = query.status.as_deref().map(|s| MovieStatus::from_str(s).ok());
    let matches = |m: &Movie| m.user_id == user.id && status.is_none_or(|s| s == Some(m.status));

    let movies = state.store.movies.find(matches, paging.skip(), Some(paging.take())).await;
    let total = state.store.movies.count(matches).await;

    Ok(ApiJson(json!({
        "success": true,
        "data": { "movies": movies, "pagination": paging.describe(total) },
    })))
}

async fn list_series(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, Failure> {
    let paging = Paging::from_query(&state.library, query.page, query.limit)?;

    let status = query.status.as_deref().map(|s| WatchStatus::from_str(s).ok());
    let matches = |s: &Series| s.user_id == user.id && status.is_none_or(|w| w == Some(s.watch_status));

    let series = state.store.series.find(matches, paging.skip(), Some(paging.take())).await;
    let total = state.store.series.count(matches).await;

    Ok(ApiJson(json!({
        "success": true,
        "data": { "series": series, "pagination": paging.describe(total) },
    })))
}

async fn update_movie(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<MoviePatch>,
) -> Result<impl IntoResponse, Failure> {
    let movie = state
        .store
        .movies
        .update_one(&id, |m| m.user_id == user.id, |m| patch.apply(m))
        .await?
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))?;

    Ok(ApiJson(json!({ "success": true, "message": "Film aggiornato", "data": movie })))
}

async fn update_series(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<SeriesPatch>,
) -> Result<impl IntoResponse, Failure> {
    let series = state
        .store
        .series
        .update_one(&id, |s| s.user_id == user.id, |s| patch.apply(s))
        .await?
        .ok_or_else(|| AppError::not_found(SERIES_NOT_FOUND))?;

    Ok(ApiJson(json!({ "success": true, "message": "Serie TV aggiornata", "data": series })))
}

async fn remove_movie(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, Failure> {
    state
        .store
        .movies
        .delete_one(&id, |m| m.user_id == user.id)
        .await?
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))?;

    Ok(ApiJson(json!({ "success": true, "message": "Film rimosso dalla libreria" })))
}

async fn remove_series(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, Failure> {
    state
        .store
        .series
        .delete_one(&id, |s| s.user_id == user.id)
        .await?
        .ok_or_else(|| AppError::not_found(SERIES_NOT_FOUND))?;

    Ok(ApiJson(json!({ "success": true, "message": "Serie TV rimossa dalla libreria" })))
}

async fn stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, Failure> {
    let movies = state.store.movies.find(|m| m.user_id == user.id, 0, None).await;
    let series = state.store.series.find(|s| s.user_id == user.id, 0, None).await;

    Ok(ApiJson(json!({
        "success": true,
        "data": {
            "movies": MovieStats::from_movies(&movies),
            "series": SeriesStats::from_series(&series),
        },
    })))
}
