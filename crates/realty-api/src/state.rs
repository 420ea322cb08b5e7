use std::sync::Arc;

use realty_core::{ConfigManager, DatabaseBackend, Result, SeedData, Settings, Store};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::auth::AdminAuth;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub settings: Arc<Settings>,
    pub auth: Arc<AdminAuth>,
    /// Held by admin writes across their integrity checks and the write.
    pub admin_writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, store: Store) -> Self {
        let auth = Arc::new(AdminAuth::from_settings(&settings));
        Self {
            store,
            settings,
            auth,
            admin_writes: Arc::new(Mutex::new(())),
        }
    }

    /// Connects the configured backend and seeds the in-memory one.
    pub async fn from_config(config: &ConfigManager) -> Result<Self> {
        let settings = config.settings();
        let store = Store::from_settings(&settings.database)?;

        if let Some(seed_path) = &settings.database.seed_path {
            if settings.database.backend == DatabaseBackend::Memory {
                let seed = SeedData::from_file(seed_path).await?;
                info!(path = %seed_path.display(), rows = seed.len(), "Loading seed data");
                seed.apply(&store).await?;
            } else {
                warn!(path = %seed_path.display(), "Ignoring seed_path for the rest backend");
            }
        }

        let state = Self::new(settings, store);
        if !state.auth.enabled() {
            warn!("admin.password_hash is not set; admin endpoints are disabled");
        }
        Ok(state)
    }
}
