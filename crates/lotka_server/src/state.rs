//! Shared, read-only application state.

use std::path::PathBuf;
use std::time::Duration;

use lotka_core::{IntegratorSettings, SimulationLimits};

use crate::config::ServerConfig;

/// Everything handlers need besides the request itself. Immutable after
/// startup, so concurrent requests share it without locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub limits: SimulationLimits,
    pub settings: IntegratorSettings,
    pub timeout: Duration,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            limits: config.limits,
            settings: config.settings,
            timeout: config.timeout,
            static_dir: config.static_dir.clone(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}
