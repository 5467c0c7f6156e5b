use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_engine::{
    ApiSettings, EngineSettings, PollSettings, DEFAULT_BACKEND_URL, DEFAULT_POLL_INTERVAL,
};
use scout_logging::{scout_info, scout_warn};
use serde::Deserialize;

const CONFIG_FILENAME: &str = "config.ron";

/// Optional settings read from `config.ron`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    backend_url: Option<String>,
    #[serde(default)]
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_dir: PathBuf,
    pub backend_url: String,
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Flag or environment value first, then `config.ron`, then the default.
    pub fn resolve(
        config_dir: &Path,
        backend_url: Option<String>,
        poll_interval_ms: Option<u64>,
    ) -> Self {
        let file = load_config_file(config_dir);
        let backend_url = backend_url
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let poll_interval = poll_interval_ms
            .or(file.poll_interval_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        Self {
            config_dir: config_dir.to_path_buf(),
            backend_url,
            poll_interval,
        }
    }

    pub fn engine_settings(&self, cookie: Option<String>) -> EngineSettings {
        EngineSettings {
            api: ApiSettings {
                base_url: self.backend_url.clone(),
                ..ApiSettings::default()
            },
            poll: PollSettings {
                interval: self.poll_interval,
            },
            cookie,
            watch_interrupts: true,
        }
    }
}

fn load_config_file(config_dir: &Path) -> ConfigFile {
    let path = config_dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ConfigFile::default();
        }
        Err(err) => {
            scout_warn!("Failed to read config from {:?}: {}", path, err);
            return ConfigFile::default();
        }
    };

    match ron::from_str(&content) {
        Ok(file) => {
            scout_info!("Loaded config from {:?}", path);
            file
        }
        Err(err) => {
            scout_warn!("Failed to parse config from {:?}: {}", path, err);
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn defaults_without_a_config_file() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(dir.path(), None, None);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.config_dir, dir.path());
    }

    #[test]
    fn config_file_fills_unset_values() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"(backend_url: Some("http://jobs.internal:9000"), poll_interval_ms: Some(750))"#,
        );
        let config = AppConfig::resolve(dir.path(), None, None);
        assert_eq!(config.backend_url, "http://jobs.internal:9000");
        assert_eq!(config.poll_interval, Duration::from_millis(750));
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"(backend_url: Some("http://jobs.internal:9000"), poll_interval_ms: Some(750))"#,
        );
        let config = AppConfig::resolve(
            dir.path(),
            Some("http://flag.test".to_string()),
            Some(100),
        );
        assert_eq!(config.backend_url, "http://flag.test");
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn corrupt_config_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "this is not ron");
        let config = AppConfig::resolve(dir.path(), None, None);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn engine_settings_carry_the_resolved_values() {
        let dir = TempDir::new().unwrap();
        let config =
            AppConfig::resolve(dir.path(), Some("http://api.test".to_string()), Some(40));
        let settings = config.engine_settings(Some("appToken=abc".to_string()));
        assert_eq!(settings.api.base_url, "http://api.test");
        assert_eq!(settings.poll.interval, Duration::from_millis(40));
        assert_eq!(settings.cookie.as_deref(), Some("appToken=abc"));
        assert!(settings.watch_interrupts);
    }
}
