use std::sync::Arc;

use showtracker_auth::{PasswordHasher, TokenIssuer};
use showtracker_catalog::TmdbClient;
use showtracker_config::LibraryConfig;
use showtracker_store::Store;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub catalog: TmdbClient,
    pub tokens: TokenIssuer,
    pub passwords: PasswordHasher,
    pub library: LibraryConfig,
}
