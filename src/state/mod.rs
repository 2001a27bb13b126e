use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::{asset_store::AssetStore, source::ImageSource},
};

/// Handle cloned into every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the serving directory and the upstream client.
pub struct AppState {
    config: AppConfig,
    store: AssetStore,
    source: Arc<dyn ImageSource>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, source: Arc<dyn ImageSource>) -> SharedState {
        let store = AssetStore::new(
            config.public_dir.clone(),
            config.fresh_window_minutes,
            config.write_grace,
        );
        Arc::new(Self {
            config,
            store,
            source,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Store owning the serving directory.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Client used to download source images.
    pub fn source(&self) -> &dyn ImageSource {
        self.source.as_ref()
    }
}
