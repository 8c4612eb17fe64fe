use serde::Deserialize;

/// Execution mode of the process
///
/// Decided once at startup and handed to the components that behave
/// differently per mode; nothing reads it from the process environment
/// while serving requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    /// Local development: error responses carry diagnostics
    Development,
    /// Automated tests
    Test,
    /// Anything public facing
    #[default]
    Production,
}

impl Environment {
    /// Whether error responses include stack traces and kind names
    pub const fn diagnostics_enabled(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Whether handled failures are logged before the response is written
    pub const fn log_failures(self) -> bool {
        !matches!(self, Self::Production)
    }
}
