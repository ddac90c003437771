use std::sync::Arc;

use crate::auth::credentials::Credentials;
use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::export::store::OutputStore;
use crate::generation::backend::GenerationBackend;
use crate::generation::tone::ToneCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub credentials: Arc<Credentials>,
    pub sessions: SessionStore,
    pub tones: Arc<ToneCatalog>,
    /// Pluggable text/image backend. Production: `AzureClient`.
    pub backend: Arc<dyn GenerationBackend>,
    pub store: OutputStore,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn GenerationBackend>) -> Self {
        let credentials = Credentials::new(config.username.clone(), config.password_hash.clone());
        let sessions = SessionStore::new(std::time::Duration::from_secs(
            config.session_ttl_minutes * 60,
        ));
        let store = OutputStore::new(config.generated_dir.clone(), config.image_dir.clone());

        Self {
            config,
            credentials: Arc::new(credentials),
            sessions,
            tones: Arc::new(ToneCatalog::new()),
            backend,
            store,
        }
    }
}
