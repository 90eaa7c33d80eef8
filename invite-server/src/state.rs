use std::sync::Arc;

use anyhow::Result;
use invite_core::InviteConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<InviteConfig>,
}

impl AppState {
    pub fn new(config: InviteConfig) -> Self {
        AppState {
            config: Arc::new(config),
        }
    }

    /// Load the config file once at startup.
    pub fn load() -> Result<Self> {
        Ok(Self::new(InviteConfig::load()?))
    }

    pub fn config(&self) -> &InviteConfig {
        &self.config
    }
}
