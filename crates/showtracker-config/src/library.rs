use serde::Deserialize;

/// Paging limits for library listings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Page size used when the request omits `limit`
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Largest `limit` a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

const fn default_page_size() -> u64 {
    20
}

const fn default_max_page_size() -> u64 {
    100
}
