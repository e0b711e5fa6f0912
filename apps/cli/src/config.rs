use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "codex-uptime";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_DIR_NAME: &str = "data";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8008;
const DEFAULT_PORT_RETRY_COUNT: u16 = 20;
const DEFAULT_SESSIONS_DIR: &str = "~/.codex/sessions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub port_retry_count: u16,
    pub sessions_dir: String,
    pub include_local: bool,
    /// Defaults to a `data` directory next to the config file.
    pub data_dir: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            port_retry_count: DEFAULT_PORT_RETRY_COUNT,
            sessions_dir: DEFAULT_SESSIONS_DIR.to_string(),
            include_local: true,
            data_dir: None,
        }
    }
}

impl CliConfig {
    /// Applies `CODEX_*` overrides. Unparseable numbers are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("CODEX_SESSIONS_DIR").filter(|value| !value.trim().is_empty()) {
            self.sessions_dir = dir;
        }
        if let Some(flag) = lookup("CODEX_INCLUDE_LOCAL") {
            self.include_local = flag.trim() != "0";
        }
        if let Some(host) = lookup("CODEX_UPTIME_HOST").filter(|value| !value.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = parse_env(&lookup, "CODEX_UPTIME_PORT") {
            self.port = port;
        }
        if let Some(count) = parse_env(&lookup, "CODEX_PORT_RETRY_COUNT") {
            self.port_retry_count = count;
        }
    }
}

fn parse_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u16> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u16>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "ignoring invalid environment override");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
    pub default_data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad> {
    let dir = dirs::config_dir()
        .context("resolve platform config directory")?
        .join(CONFIG_DIR_NAME);
    let mut load = load_or_create_in(dir)?;
    load.config.apply_env(|key| std::env::var(key).ok());
    Ok(load)
}

pub fn load_or_create_in(dir: PathBuf) -> Result<ConfigLoad> {
    fs::create_dir_all(&dir).with_context(|| format!("create config dir {}", dir.display()))?;
    let paths = ConfigPaths {
        file: dir.join(CONFIG_FILE_NAME),
        default_data_dir: dir.join(DATA_DIR_NAME),
    };

    if paths.file.exists() {
        let contents = fs::read_to_string(&paths.file)
            .with_context(|| format!("read config {}", paths.file.display()))?;
        let config: CliConfig = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", paths.file.display()))?;
        return Ok(ConfigLoad {
            config,
            paths,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents = toml::to_string_pretty(&config).context("serialize config")?;
    fs::write(&paths.file, contents)
        .with_context(|| format!("write config {}", paths.file.display()))?;

    Ok(ConfigLoad {
        config,
        paths,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn creates_default_config_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = load_or_create_in(dir.path().join("codex-uptime")).expect("create");
        assert!(first.created);
        assert_eq!(first.config, CliConfig::default());
        assert_eq!(first.config.port, 8008);

        let second = load_or_create_in(dir.path().join("codex-uptime")).expect("load");
        assert!(!second.created);
        assert_eq!(second.config, first.config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "port = 9100\n").expect("write");
        let load = load_or_create_in(dir.path().to_path_buf()).expect("load");
        assert_eq!(load.config.port, 9100);
        assert_eq!(load.config.host, "127.0.0.1");
        assert_eq!(load.config.port_retry_count, 20);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CODEX_SESSIONS_DIR", "/srv/sessions"),
            ("CODEX_INCLUDE_LOCAL", "0"),
            ("CODEX_UPTIME_PORT", "9001"),
            ("CODEX_PORT_RETRY_COUNT", "lots"),
        ]);
        let mut config = CliConfig::default();
        config.apply_env(|key| env.get(key).map(|value| value.to_string()));
        assert_eq!(config.sessions_dir, "/srv/sessions");
        assert!(!config.include_local);
        assert_eq!(config.port, 9001);
        assert_eq!(config.port_retry_count, 20);
        assert_eq!(config.host, "127.0.0.1");
    }
}
