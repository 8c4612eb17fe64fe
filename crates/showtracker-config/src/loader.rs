use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

/// bcrypt accepts work factors in this range
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_auth_config()?;
        self.validate_catalog_config()?;
        self.validate_library_config()?;
        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            anyhow::bail!("auth.jwt_secret must not be empty");
        }

        if !BCRYPT_COST_RANGE.contains(&self.auth.bcrypt_cost) {
            anyhow::bail!(
                "auth.bcrypt_cost must be between {} and {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            );
        }

        let access = self.auth.token_ttl_duration()?;
        let refresh = self.auth.refresh_token_ttl_duration()?;

        if access.is_zero() || refresh.is_zero() {
            anyhow::bail!("auth token lifetimes must be greater than 0");
        }

        Ok(())
    }

    fn validate_catalog_config(&self) -> anyhow::Result<()> {
        if self.catalog.timeout_duration()?.is_zero() {
            anyhow::bail!("catalog.timeout must be greater than 0");
        }

        if self.catalog.base_url.cannot_be_a_base() {
            anyhow::bail!("catalog.base_url must be an absolute http(s) URL");
        }

        Ok(())
    }

    fn validate_library_config(&self) -> anyhow::Result<()> {
        let library = &self.library;

        if library.default_page_size == 0 || library.max_page_size == 0 {
            anyhow::bail!("library page sizes must be greater than 0");
        }

        if library.default_page_size > library.max_page_size {
            anyhow::bail!("library.default_page_size cannot exceed library.max_page_size");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::{Environment, LogFormat};

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml("[auth]\njwt_secret = \"secret\"\n").unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.auth.issuer, "showtracker-app");
        assert_eq!(config.auth.audience, "showtracker-users");
        assert_eq!(config.auth.bcrypt_cost, 12);
        assert_eq!(config.catalog.language, "it-IT");
        assert_eq!(config.library.default_page_size, 20);
        assert!(config.server.health.enabled);
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
    }

    #[test]
    fn full_config_round_trips_through_env_expansion() {
        let raw = indoc! {r#"
            environment = "{{ env.ST_LOADER_ENV | default("production") }}"

            [server]
            listen_address = "127.0.0.1:4000"
            body_limit = 1024

            [server.cors]
            origins = ["http://localhost:3000", "http://127.0.0.1:3000"]
            credentials = true

            [auth]
            jwt_secret = "{{ env.ST_LOADER_SECRET }}"
            token_ttl = "1h"

            [catalog]
            base_url = "http://127.0.0.1:9999/3/"
            access_token = "token"
            timeout = "2s"

            [telemetry]
            filter = "debug"
            format = "json"
        "#};

        let vars = [("ST_LOADER_ENV", Some("development")), ("ST_LOADER_SECRET", Some("from-env"))];
        temp_env::with_vars(vars, || {
            let config = Config::from_toml(raw).unwrap();

            assert_eq!(config.environment, Environment::Development);
            assert_eq!(config.server.body_limit, 1024);
            assert!(config.server.cors.as_ref().unwrap().credentials);
            assert_eq!(config.auth.token_ttl_duration().unwrap().as_secs(), 3600);
            assert_eq!(config.catalog.timeout_duration().unwrap().as_secs(), 2);
            assert_eq!(config.telemetry.format, LogFormat::Json);
            assert_eq!(secrecy::ExposeSecret::expose_secret(&config.auth.jwt_secret), "from-env");
        });
    }

    #[test]
    fn empty_jwt_secret_is_rejected() {
        let err = Config::from_toml("[auth]\njwt_secret = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn missing_auth_section_is_rejected() {
        let err = Config::from_toml("environment = \"test\"\n").unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn bcrypt_cost_out_of_range_is_rejected() {
        let err = Config::from_toml("[auth]\njwt_secret = \"s\"\nbcrypt_cost = 2\n").unwrap_err();
        assert!(err.to_string().contains("bcrypt_cost"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = Config::from_toml("[auth]\njwt_secret = \"s\"\ntoken_ttl = \"soon\"\n").unwrap_err();
        assert!(err.to_string().contains("auth.token_ttl"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[auth]\njwt_secret = \"s\"\n[database]\nuri = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn default_page_size_cannot_exceed_max() {
        let raw = "[auth]\njwt_secret = \"s\"\n[library]\ndefault_page_size = 50\nmax_page_size = 10\n";
        let err = Config::from_toml(raw).unwrap_err();
        assert!(err.to_string().contains("default_page_size"));
    }
}
