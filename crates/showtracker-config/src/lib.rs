#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod catalog;
pub mod cors;
mod env;
pub mod environment;
pub mod health;
pub mod library;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use auth::*;
pub use catalog::*;
pub use cors::*;
pub use environment::*;
pub use health::*;
pub use library::*;
pub use server::*;
pub use telemetry::*;

/// Top-level ShowTracker configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Execution mode, defaults to production
    #[serde(default)]
    pub environment: Environment,
    /// HTTP listener and middleware
    #[serde(default)]
    pub server: ServerConfig,
    /// Accounts and tokens
    #[serde(default)]
    pub auth: AuthConfig,
    /// Third-party catalog client
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Library listing limits
    #[serde(default)]
    pub library: LibraryConfig,
    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
