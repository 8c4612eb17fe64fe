//! Mock TMDb backend for integration tests
//!
//! Serves a handful of canned titles under `/3/`. Unknown ids answer 404 the
//! way TMDb does, and id 500 always fails with an internal error.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Movie id the mock knows about
pub const MATRIX: u64 = 603;
/// Second known movie
pub const INCEPTION: u64 = 27205;
/// TV show id the mock knows about
pub const GAME_OF_THRONES: u64 = 1399;
/// Any endpoint given this id answers 500
pub const BROKEN_ID: u64 = 500;

/// Mock catalog that returns predictable responses
pub struct MockCatalog {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockCatalogState>,
}

#[derive(Default)]
struct MockCatalogState {
    request_count: AtomicU32,
    last_authorization: Mutex<Option<String>>,
    last_query: Mutex<Vec<(String, String)>>,
}

impl MockCatalog {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockCatalogState::default());

        let api = Router::new()
            .route("/search/{kind}", routing::get(handle_search))
            .route("/movie/popular", routing::get(handle_popular_movies))
            .route("/tv/popular", routing::get(handle_popular_tv))
            .route("/trending/{media_type}/{window}", routing::get(handle_trending))
            .route("/movie/{id}", routing::get(handle_movie))
            .route("/tv/{id}", routing::get(handle_tv))
            .route("/genre/movie/list", routing::get(handle_movie_genres))
            .route("/genre/tv/list", routing::get(handle_tv_genres))
            .layer(middleware::from_fn_with_state(Arc::clone(&state), record));

        let app = Router::new().nest("/3", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// API root to put in `catalog.base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}/3/", self.addr)
    }

    /// Total requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// `Authorization` header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    /// Value of query parameter `key` on the most recent request
    pub fn last_query_param(&self, key: &str) -> Option<String> {
        self.state
            .last_query
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn record(State(state): State<Arc<MockCatalogState>>, request: Request, next: Next) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let authorization = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    *state.last_authorization.lock().unwrap() = authorization;

    let query = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();
    *state.last_query.lock().unwrap() = query;

    next.run(request).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "status_code": 34,
            "status_message": "The resource you requested could not be found.",
        })),
    )
        .into_response()
}

fn broken() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "status_code": 11, "status_message": "Internal error." })),
    )
        .into_response()
}

fn page(results: Vec<Value>) -> Json<Value> {
    let total = results.len();
    Json(json!({
        "page": 1,
        "results": results,
        "total_pages": 1,
        "total_results": total,
    }))
}

fn movie_summary(id: u64) -> Value {
    match id {
        MATRIX => json!({ "id": MATRIX, "title": "Matrix", "media_type": "movie", "release_date": "1999-03-30" }),
        _ => json!({ "id": INCEPTION, "title": "Inception", "media_type": "movie", "release_date": "2010-07-15" }),
    }
}

fn tv_summary() -> Value {
    json!({ "id": GAME_OF_THRONES, "name": "Il Trono di Spade", "media_type": "tv", "first_air_date": "2011-04-17" })
}

async fn handle_search(Path(kind): Path<String>, Query(params): Query<Vec<(String, String)>>) -> Response {
    let query = params
        .iter()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v.to_lowercase())
        .unwrap_or_default();

    let mut results = match kind.as_str() {
        "movie" => vec![movie_summary(MATRIX), movie_summary(INCEPTION)],
        "tv" => vec![tv_summary()],
        "multi" => vec![movie_summary(MATRIX), movie_summary(INCEPTION), tv_summary()],
        _ => return not_found(),
    };

    results.retain(|r| {
        let title = r["title"].as_str().or_else(|| r["name"].as_str()).unwrap_or_default();
        title.to_lowercase().contains(&query)
    });

    page(results).into_response()
}

async fn handle_popular_movies() -> Json<Value> {
    page(vec![movie_summary(INCEPTION), movie_summary(MATRIX)])
}

async fn handle_popular_tv() -> Json<Value> {
    page(vec![tv_summary()])
}

async fn handle_trending(Path((media_type, window)): Path<(String, String)>) -> Response {
    if !matches!(window.as_str(), "day" | "week") {
        return not_found();
    }

    let results = match media_type.as_str() {
        "movie" => vec![movie_summary(MATRIX)],
        "tv" => vec![tv_summary()],
        "person" => vec![json!({ "id": 6384, "name": "Keanu Reeves", "media_type": "person" })],
        "all" => vec![movie_summary(MATRIX), tv_summary()],
        _ => return not_found(),
    };

    page(results).into_response()
}

async fn handle_movie(Path(id): Path<u64>) -> Response {
    match id {
        MATRIX => Json(json!({
            "id": MATRIX,
            "title": "Matrix",
            "original_title": "The Matrix",
            "overview": "Un hacker scopre la verità sulla realtà.",
            "poster_path": "/matrix.jpg",
            "backdrop_path": "/matrix-bg.jpg",
            "release_date": "1999-03-30",
            "runtime": 136,
            "genres": [{ "id": 28, "name": "Azione" }, { "id": 878, "name": "Fantascienza" }],
            "vote_average": 8.2,
            "vote_count": 25000,
            "popularity": 80.5,
            "original_language": "en",
            "adult": false,
            "credits": { "cast": [{ "name": "Keanu Reeves" }] },
            "videos": { "results": [] },
            "images": { "backdrops": [] },
        }))
        .into_response(),
        INCEPTION => Json(json!({
            "id": INCEPTION,
            "title": "Inception",
            "release_date": "",
            "runtime": null,
            "genres": [],
        }))
        .into_response(),
        BROKEN_ID => broken(),
        _ => not_found(),
    }
}

async fn handle_tv(Path(id): Path<u64>) -> Response {
    match id {
        GAME_OF_THRONES => Json(json!({
            "id": GAME_OF_THRONES,
            "name": "Il Trono di Spade",
            "original_name": "Game of Thrones",
            "overview": "Nove famiglie nobili combattono per il controllo di Westeros.",
            "poster_path": "/got.jpg",
            "first_air_date": "2011-04-17",
            "last_air_date": "2019-05-19",
            "number_of_seasons": 8,
            "number_of_episodes": 73,
            "episode_run_time": [60],
            "genres": [{ "id": 18, "name": "Dramma" }],
            "vote_average": 8.4,
            "original_language": "en",
            "status": "Ended",
            "type": "Scripted",
        }))
        .into_response(),
        BROKEN_ID => broken(),
        _ => not_found(),
    }
}

async fn handle_movie_genres() -> Json<Value> {
    Json(json!({ "genres": [{ "id": 28, "name": "Azione" }, { "id": 878, "name": "Fantascienza" }] }))
}

async fn handle_tv_genres() -> Json<Value> {
    Json(json!({ "genres": [{ "id": 18, "name": "Dramma" }] }))
}
