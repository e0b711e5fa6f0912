use crate::app::AppConfig;
use crate::Result;

/// Creates the data directory and the mirror root that synced sources live under.
pub fn ensure_app_data_dir(config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    std::fs::create_dir_all(config.sources_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_data_and_sources_dirs() {
        let dir = tempdir().expect("temp dir");
        let config = AppConfig::new(dir.path().join("sessions"), true, dir.path().join("data"));
        ensure_app_data_dir(&config).expect("ensure");
        assert!(config.sources_dir().is_dir());
        assert!(!config.sessions_dir.exists());
    }
}
