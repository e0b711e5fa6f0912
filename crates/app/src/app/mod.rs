use std::path::PathBuf;

use crate::services::AppServices;

const PRICING_FILE: &str = "pricing.json";
const SOURCES_FILE: &str = "sources.json";
const SOURCES_DIR: &str = "sources";

/// Resolved runtime configuration for the uptime engine.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sessions_dir: PathBuf,
    pub include_local: bool,
    pub data_dir: PathBuf,
    pub pricing_path: PathBuf,
}

impl AppConfig {
    pub fn new(sessions_dir: PathBuf, include_local: bool, data_dir: PathBuf) -> Self {
        let pricing_path = data_dir.join(PRICING_FILE);
        Self {
            sessions_dir,
            include_local,
            data_dir,
            pricing_path,
        }
    }

    pub fn sources_path(&self) -> PathBuf {
        self.data_dir.join(SOURCES_FILE)
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.data_dir.join(SOURCES_DIR)
    }

    /// Local mirror of a synced source.
    pub fn source_sessions_dir(&self, id: &str) -> PathBuf {
        self.sources_dir().join(id).join("sessions")
    }
}

/// Application state shared by frontend backends (HTTP, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }
}
