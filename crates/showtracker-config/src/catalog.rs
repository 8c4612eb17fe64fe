use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Third-party movie/TV catalog (TMDb) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// API root, requests are made relative to it
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// v4 read access token sent as a bearer token
    #[serde(default = "default_access_token")]
    pub access_token: SecretString,

    /// Language requested for titles and overviews
    #[serde(default = "default_language")]
    pub language: String,

    /// Root for poster and backdrop URLs
    #[serde(default = "default_image_base_url")]
    pub image_base_url: Url,

    /// Per-request timeout, e.g. `"10s"`
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl CatalogConfig {
    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is not a valid duration
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        crate::auth::parse_duration("catalog.timeout", &self.timeout)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: default_access_token(),
            language: default_language(),
            image_base_url: default_image_base_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.themoviedb.org/3/").expect("must be valid URL")
}

fn default_access_token() -> SecretString {
    SecretString::from("")
}

fn default_language() -> String {
    "it-IT".to_string()
}

fn default_image_base_url() -> Url {
    Url::parse("https://image.tmdb.org/t/p/").expect("must be valid URL")
}

fn default_timeout() -> String {
    "10s".to_string()
}
