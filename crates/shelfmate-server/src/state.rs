use std::sync::Arc;

use shelfmate_core::{AppConfig, Database, PoolSettings};

pub struct AppState {
    pub db: Database,
    pub settings: PoolSettings,
}

impl AppState {
    pub fn new(db: Database, settings: PoolSettings) -> Arc<Self> {
        Arc::new(Self { db, settings })
    }

    /// Open the configured database, creating its directory if needed.
    pub fn from_config(config: &AppConfig) -> shelfmate_core::Result<Arc<Self>> {
        let path = config.database_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&path)?;
        Ok(Self::new(db, config.pool.clone()))
    }
}
