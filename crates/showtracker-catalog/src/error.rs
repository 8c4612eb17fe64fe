use thiserror::Error;

/// Failures talking to the catalog
///
/// Every variant names the operation that failed so the message can be
/// shown to API consumers as is.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Connection, timeout or TLS failure
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The catalog has no such title
    #[error("{context}: title not found")]
    NotFound { context: &'static str },

    /// Any other non-success status
    #[error("{context}: catalog returned status {status}")]
    Upstream {
        context: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("{context}: unreadable response: {message}")]
    Decode { context: &'static str, message: String },

    /// Request path could not be joined onto the base URL
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CatalogError {
    /// Operation that failed, e.g. `"Errore ricerca film"`
    pub const fn context(&self) -> &'static str {
        match self {
            Self::Transport { context, .. }
            | Self::NotFound { context }
            | Self::Upstream { context, .. }
            | Self::Decode { context, .. } => *context,
            Self::Url(_) => "Errore catalogo",
        }
    }
}
