use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use showtracker_config::CatalogConfig;
use url::Url;

use crate::error::CatalogError;
use crate::types::{Genre, SearchKind, TimeWindow, TrendingMediaType};

/// Sub-resources appended to detail requests
const DETAIL_APPENDS: &str = "credits,videos,images";

/// HTTP client for the TMDb v3 API
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: Url,
    image_base_url: Url,
    access_token: SecretString,
    language: String,
}

#[derive(Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

impl TmdbClient {
    /// Build a client from the `[catalog]` section
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is invalid or the HTTP client cannot
    /// be built
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(config.timeout_duration()?).build()?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(config.base_url.clone()),
            image_base_url: with_trailing_slash(config.image_base_url.clone()),
            access_token: config.access_token.clone(),
            language: config.language.clone(),
        })
    }

    /// Search titles with the endpoint selected by `kind`
    pub async fn search(&self, kind: SearchKind, query: &str, page: u32) -> Result<Value, CatalogError> {
        let context = match kind {
            SearchKind::Multi => "Errore ricerca",
            SearchKind::Movie => "Errore ricerca film",
            SearchKind::Tv => "Errore ricerca serie TV",
        };
        let path = format!("search/{}", kind.as_ref());

        self.get(context, &path, &[("query", query.to_owned()), ("page", page.to_string())])
            .await
    }

    pub async fn search_multi(&self, query: &str, page: u32) -> Result<Value, CatalogError> {
        self.search(SearchKind::Multi, query, page).await
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Value, CatalogError> {
        self.search(SearchKind::Movie, query, page).await
    }

    pub async fn search_tv(&self, query: &str, page: u32) -> Result<Value, CatalogError> {
        self.search(SearchKind::Tv, query, page).await
    }

    /// Movie details with credits, videos and images appended
    ///
    /// Generic over the response type so callers can take the raw JSON or
    /// a typed view such as `MovieDetails`.
    pub async fn movie_details<T: DeserializeOwned>(&self, id: u64) -> Result<T, CatalogError> {
        self.get(
            "Errore dettagli film",
            &format!("movie/{id}"),
            &[("append_to_response", DETAIL_APPENDS.to_owned())],
        )
        .await
    }

    /// TV show details with credits, videos and images appended
    pub async fn tv_details<T: DeserializeOwned>(&self, id: u64) -> Result<T, CatalogError> {
        self.get(
            "Errore dettagli serie TV",
            &format!("tv/{id}"),
            &[("append_to_response", DETAIL_APPENDS.to_owned())],
        )
        .await
    }

    pub async fn popular_movies(&self, page: u32) -> Result<Value, CatalogError> {
        self.get("Errore film popolari", "movie/popular", &[("page", page.to_string())])
            .await
    }

    pub async fn popular_tv(&self, page: u32) -> Result<Value, CatalogError> {
        self.get("Errore serie TV popolari", "tv/popular", &[("page", page.to_string())])
            .await
    }

    pub async fn trending(&self, media_type: TrendingMediaType, window: TimeWindow) -> Result<Value, CatalogError> {
        let path = format!("trending/{}/{}", media_type.as_ref(), window.as_ref());
        self.get("Errore contenuti trending", &path, &[]).await
    }

    pub async fn movie_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.get("Errore generi film", "genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    pub async fn tv_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.get("Errore generi serie TV", "genre/tv/list", &[]).await?;
        Ok(list.genres)
    }

    /// Public URL of a poster or backdrop at `size` (e.g. `w500`)
    ///
    /// `None` when the title has no image.
    pub fn image_url(&self, path: Option<&str>, size: &str) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        Some(format!("{}{size}/{}", self.image_base_url, path.trim_start_matches('/')))
    }

    /// Public URL of an image at its original resolution
    pub fn full_image_url(&self, path: Option<&str>) -> Option<String> {
        self.image_url(path, "original")
    }

    async fn get<T: DeserializeOwned>(
        &self,
        context: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = self.base_url.join(path)?;

        tracing::debug!(%url, "catalog request");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .query(params)
            .query(&[("language", self.language.as_str())])
            .send()
            .await
            .map_err(|source| {
                tracing::warn!(error = %source, context, "catalog request failed");
                CatalogError::Transport { context, source }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound { context });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), context, "catalog returned an error");
            return Err(CatalogError::Upstream {
                context,
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| CatalogError::Decode {
            context,
            message: e.to_string(),
        })
    }
}

/// `Url::join` replaces the last segment unless the base ends in `/`
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
