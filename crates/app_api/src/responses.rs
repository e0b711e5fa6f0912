use serde::Serialize;
use uptime_app::{SourceSummary, SourcesSnapshot};

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceSummary>,
    pub include_local: bool,
}

impl From<SourcesSnapshot> for SourcesResponse {
    fn from(snapshot: SourcesSnapshot) -> Self {
        Self {
            sources: snapshot.sources,
            include_local: snapshot.include_local,
        }
    }
}
