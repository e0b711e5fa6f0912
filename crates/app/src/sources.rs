use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::AppConfig;

/// One remote source as stored in the registry file. Owned by the sync
/// tooling; this crate only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// A source with its credentials stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub id: String,
    pub label: String,
    pub host: String,
    pub user: String,
    pub port: Option<u16>,
    pub path: String,
    pub last_sync: Option<String>,
    pub last_error: Option<String>,
}

impl From<SourceRecord> for SourceSummary {
    fn from(record: SourceRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            host: record.host,
            user: record.user,
            port: record.port,
            path: record.path,
            last_sync: record.last_sync,
            last_error: record.last_error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesSnapshot {
    pub sources: Vec<SourceSummary>,
    pub include_local: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    sources: Vec<SourceRecord>,
}

/// Reads the registry. A missing or unreadable file is an empty registry.
pub fn load_sources(path: &Path) -> Vec<SourceRecord> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|data| {
            serde_json::from_str::<RegistryFile>(&data).map_err(|err| err.to_string())
        });
    match parsed {
        Ok(registry) => registry.sources,
        Err(err) => {
            tracing::warn!(?path, error = %err, "ignoring unreadable source registry");
            Vec::new()
        }
    }
}

/// Roots to scan: the local sessions directory when enabled and present,
/// then each registered source whose local mirror exists.
pub fn session_roots(config: &AppConfig) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if config.include_local && config.sessions_dir.is_dir() {
        roots.push(config.sessions_dir.clone());
    }
    for source in load_sources(&config.sources_path()) {
        if source.id.is_empty() {
            continue;
        }
        let mirror = config.source_sessions_dir(&source.id);
        if mirror.is_dir() {
            roots.push(mirror);
        }
    }
    roots
}
