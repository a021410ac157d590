use std::sync::Arc;

use moviebrowser_core::{Config, MovieStore, Repository};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn MovieStore>,
    repository: Repository,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn MovieStore>, repository: Repository) -> Self {
        Self {
            config,
            store,
            repository,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct store access, used for metrics collection only.
    pub fn store(&self) -> &dyn MovieStore {
        self.store.as_ref()
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}
