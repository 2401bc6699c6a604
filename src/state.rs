//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Authenticator, Sessions, StaticAuthenticator};
use crate::cache::TableCache;
use crate::config::Config;
use crate::google_api::sheets::GoogleSheetStore;
use crate::google_api::SheetsAuth;
use crate::store::SheetStore;

/// State shared by all request handlers.
///
/// The cache and session set are the only mutable pieces; both guard their
/// interior with a Mutex, so handlers hold `Arc<AppState>` immutably.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SheetStore>,
    pub cache: TableCache,
    pub sessions: Sessions,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    /// Production state: Google-Sheets-backed store from config.
    pub fn new(config: Config) -> Self {
        let auth = SheetsAuth::from_config(config.credentials_path.as_deref());
        let store = Arc::new(GoogleSheetStore::new(config.spreadsheet_id.clone(), auth));
        Self::with_store(config, store)
    }

    /// State over an explicit store implementation.
    pub fn with_store(config: Config, store: Arc<dyn SheetStore>) -> Self {
        let cache = TableCache::new(Duration::from_secs(config.cache_ttl_secs));
        let auth = Arc::new(StaticAuthenticator::new(
            config.admin_username.clone(),
            config.admin_password.clone(),
        ));
        Self {
            config,
            store,
            cache,
            sessions: Sessions::new(),
            auth,
        }
    }
}
