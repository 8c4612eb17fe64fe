use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Account and token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC key used to sign access and refresh tokens
    pub jwt_secret: SecretString,

    /// `iss` claim written and required on tokens
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// `aud` claim written and required on tokens
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Access token lifetime, e.g. `"7d"`
    #[serde(default = "default_token_ttl")]
    pub token_ttl: String,

    /// Refresh token lifetime, e.g. `"30d"`
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: String,

    /// bcrypt work factor (4..=31)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Parsed access token lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if `token_ttl` is not a valid duration
    pub fn token_ttl_duration(&self) -> anyhow::Result<Duration> {
        parse_duration("auth.token_ttl", &self.token_ttl)
    }

    /// Parsed refresh token lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if `refresh_token_ttl` is not a valid duration
    pub fn refresh_token_ttl_duration(&self) -> anyhow::Result<Duration> {
        parse_duration("auth.refresh_token_ttl", &self.refresh_token_ttl)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(""),
            issuer: default_issuer(),
            audience: default_audience(),
            token_ttl: default_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

pub(crate) fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}

fn default_issuer() -> String {
    "showtracker-app".to_string()
}

fn default_audience() -> String {
    "showtracker-users".to_string()
}

fn default_token_ttl() -> String {
    "7d".to_string()
}

fn default_refresh_token_ttl() -> String {
    "30d".to_string()
}

const fn default_bcrypt_cost() -> u32 {
    12
}
