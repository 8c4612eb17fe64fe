use std::str::FromStr;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use showtracker_catalog::{SearchKind, TimeWindow, TmdbClient, TrendingMediaType};
use showtracker_core::AppError;

use crate::auth::{CurrentUser, optional_user};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::failure::Failure;
use crate::state::AppState;

const POSTER_SIZE: &str = "w500";

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/popular/movies", get(popular_movies))
        .route("/api/popular/tv", get(popular_tv))
        .route("/api/trending", get(trending_all))
        .route("/api/trending/{media_type}", get(trending))
        .route("/api/movie/{id}", get(movie_details))
        .route("/api/tv/{id}", get(tv_details))
        .route("/api/genres/movie", get(movie_genres))
        .route("/api/genres/tv", get(tv_genres))
        .route_layer(axum::middleware::from_fn(move |req, next| {
            let state = state.clone();
            async move { optional_user(state, req, next).await }
        }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TrendingQuery {
    time_window: Option<String>,
}

fn data(value: impl serde::Serialize) -> ApiJson<Value> {
    ApiJson(json!({ "success": true, "data": value }))
}

async fn search(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<impl IntoResponse, Failure> {
    let Some(q) = query.q.filter(|q| !q.trim().is_empty()) else {
        return Err(AppError::bad_request("Query di ricerca richiesta").into());
    };

    // unknown types fall back to a multi search
    let kind = query
        .kind
        .as_deref()
        .and_then(|k| SearchKind::from_str(k).ok())
        .unwrap_or_default();

    tracing::debug!(
        kind = kind.as_ref(),
        user_id = user.as_ref().map(|Extension(CurrentUser(u))| u.id.as_str()),
        "catalog search"
    );

    let page = query.page.unwrap_or(1);
    let results = match kind {
        SearchKind::Multi => state.catalog.search_multi(&q, page).await?,
        SearchKind::Movie => state.catalog.search_movies(&q, page).await?,
        SearchKind::Tv => state.catalog.search_tv(&q, page).await?,
    };
    Ok(data(results))
}

async fn popular_movies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, Failure> {
    Ok(data(state.catalog.popular_movies(query.page.unwrap_or(1)).await?))
}

async fn popular_tv(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, Failure> {
    Ok(data(state.catalog.popular_tv(query.page.unwrap_or(1)).await?))
}

async fn trending_all(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TrendingQuery>,
) -> Result<impl IntoResponse, Failure> {
    fetch_trending(&state, TrendingMediaType::All, query).await
}

async fn trending(
    State(state): State<AppState>,
    ApiPath(media_type): ApiPath<String>,
    ApiQuery(query): ApiQuery<TrendingQuery>,
) -> Result<impl IntoResponse, Failure> {
    let media_type = TrendingMediaType::from_str(&media_type)
        .map_err(|_| AppError::bad_request(format!("Tipo di contenuto non valido: {media_type}")))?;
    fetch_trending(&state, media_type, query).await
}

async fn fetch_trending(
    state: &AppState,
    media_type: TrendingMediaType,
    query: TrendingQuery,
) -> Result<ApiJson<Value>, Failure> {
    let window = match query.time_window.as_deref() {
        None => TimeWindow::default(),
        Some(raw) => TimeWindow::from_str(raw)
            .map_err(|_| AppError::bad_request(format!("Intervallo temporale non valido: {raw}")))?,
    };

    Ok(data(state.catalog.trending(media_type, window).await?))
}

async fn movie_details(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<impl IntoResponse, Failure> {
    let details: Value = state.catalog.movie_details(id).await?;
    Ok(data(with_image_urls(&state.catalog, details)))
}

async fn tv_details(State(state): State<AppState>, ApiPath(id): ApiPath<u64>) -> Result<impl IntoResponse, Failure> {
    let details: Value = state.catalog.tv_details(id).await?;
    Ok(data(with_image_urls(&state.catalog, details)))
}

/// Add absolute `poster_url` and `backdrop_url` next to the catalog paths
fn with_image_urls(catalog: &TmdbClient, mut details: Value) -> Value {
    if let Some(fields) = details.as_object_mut() {
        let poster = catalog.image_url(fields.get("poster_path").and_then(Value::as_str), POSTER_SIZE);
        let backdrop = catalog.full_image_url(fields.get("backdrop_path").and_then(Value::as_str));
        fields.insert("poster_url".to_owned(), poster.into());
        fields.insert("backdrop_url".to_owned(), backdrop.into());
    }
    details
}

async fn movie_genres(State(state): State<AppState>) -> Result<impl IntoResponse, Failure> {
    Ok(data(state.catalog.movie_genres().await?))
}

async fn tv_genres(State(state): State<AppState>) -> Result<impl IntoResponse, Failure> {
    Ok(data(state.catalog.tv_genres().await?))
}
