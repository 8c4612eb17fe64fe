//! HTTP surface of ShowTracker
//!
//! Every route is wrapped by the error boundary: handlers return
//! `Result<_, Failure>` (or panic) and the [`Normalizer`] writes the single
//! error response.

mod auth;
mod boundary;
mod cors;
mod extract;
mod failure;
mod health;
mod normalizer;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use http::StatusCode;
use showtracker_auth::{PasswordHasher, TokenIssuer};
use showtracker_catalog::TmdbClient;
use showtracker_config::Config;
use showtracker_core::{AppError, ErrorKind};
use showtracker_store::Store;
use tower_http::trace::TraceLayer;

pub use boundary::error_boundary;
pub use failure::{Failure, PendingFailure};
pub use normalizer::Normalizer;

use crate::state::AppState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client or the token issuer cannot be
    /// built from the configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let state = AppState {
            store: Arc::new(Store::new()),
            catalog: TmdbClient::new(&config.catalog).context("failed to build catalog client")?,
            tokens: TokenIssuer::from_config(&config.auth).context("failed to build token issuer")?,
            passwords: PasswordHasher::new(config.auth.bcrypt_cost),
            library: config.library.clone(),
        };

        let normalizer = Normalizer::for_environment(config.environment);
        tracing::debug!(environment = %config.environment, ?normalizer, "error normalizer configured");

        let mut app = routes::api_router(state);

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed);

        // Apply middleware layers (innermost first)

        // Request body limit for JSON extractors
        app = app.layer(DefaultBodyLimit::max(config.server.body_limit));

        // Panics and failures become normalized error responses
        app = error_boundary(app, normalizer);

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address)
            .await
            .with_context(|| format!("failed to bind {}", self.listen_address))?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn not_found() -> Failure {
    AppError::new(ErrorKind::NotFound).into()
}

async fn method_not_allowed() -> Failure {
    AppError::with_status(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into()
}
