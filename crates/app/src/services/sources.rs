use crate::services::SharedConfig;
use crate::sources::{SourceSummary, SourcesSnapshot, load_sources};

#[derive(Clone)]
pub struct SourcesService {
    config: SharedConfig,
}

impl SourcesService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn list(&self) -> SourcesSnapshot {
        let sources = load_sources(&self.config.sources_path())
            .into_iter()
            .map(SourceSummary::from)
            .collect();
        SourcesSnapshot {
            sources,
            include_local: self.config.include_local,
        }
    }
}
