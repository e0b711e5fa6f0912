mod sources;
mod uptime;

use std::sync::Arc;

use crate::app::AppConfig;

pub use sources::SourcesService;
pub use uptime::{UptimeService, UsageQuery, compute_usage};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub uptime: UptimeService,
    pub sources: SourcesService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            uptime: UptimeService::new(shared.clone()),
            sources: SourcesService::new(shared),
        }
    }
}
