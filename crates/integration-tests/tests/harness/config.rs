//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use showtracker_config::{
    AuthConfig, CatalogConfig, Config, CorsConfig, Environment, HealthConfig, LibraryConfig, ServerConfig,
};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    ///
    /// Uses the cheapest bcrypt cost and production error responses.
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                auth: AuthConfig {
                    jwt_secret: SecretString::from("integration-test-secret"),
                    bcrypt_cost: 4,
                    ..AuthConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point the catalog client at a mock backend
    pub fn with_catalog(mut self, base_url: &str) -> Self {
        self.config.catalog = CatalogConfig {
            base_url: base_url.parse().expect("valid URL"),
            access_token: SecretString::from("test-token"),
            timeout: "2s".to_owned(),
            ..CatalogConfig::default()
        };
        self
    }

    /// Set the execution mode
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Set library paging limits
    pub fn with_page_sizes(mut self, default_page_size: u64, max_page_size: u64) -> Self {
        self.config.library = LibraryConfig {
            default_page_size,
            max_page_size,
        };
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
