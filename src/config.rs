use eyre::{Context, Result};
use rotor::domain::Role;
use rotor::rotation::CountWindow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub storage: StorageConfig,
    pub rotation: RotationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rotor")
                .join("rotor.db"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub count_window: CountWindow,
}

/// Identity used when no `--user` is given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: Option<u32>,
    pub role: Role,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            storage: StorageConfig::default(),
            rotation: RotationConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Logger filter directives: `RUST_LOG` when set, otherwise `log_level`.
    pub fn log_filters<'a>(&'a self, rust_log: Option<&'a str>) -> Option<&'a str> {
        rust_log
            .filter(|value| !value.trim().is_empty())
            .or(self.log_level.as_deref())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.rotation.count_window, CountWindow::AllTime);
        assert!(config.session.user_id.is_none());
        assert_eq!(config.session.role, Role::User);
        assert!(config.storage.db_path.ends_with("rotor/rotor.db"));
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rotor.yml");
        fs::write(
            &path,
            "rotation:\n  count_window: weekly\nsession:\n  user_id: 7\n  role: admin\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.rotation.count_window, CountWindow::Weekly);
        assert_eq!(config.session.user_id, Some(7));
        assert_eq!(config.session.role, Role::Admin);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_log_filters_prefer_rust_log() {
        let mut config = Config::default();
        assert_eq!(config.log_filters(None), Some("info"));
        assert_eq!(config.log_filters(Some("rotor=debug")), Some("rotor=debug"));
        assert_eq!(config.log_filters(Some("  ")), Some("info"));

        config.log_level = Some("warn".to_string());
        assert_eq!(config.log_filters(None), Some("warn"));

        config.log_level = None;
        assert_eq!(config.log_filters(None), None);
    }

    #[test]
    fn test_log_level_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rotor.yml");
        fs::write(&path, "log_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_filters(None), Some("debug"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_window() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rotor.yml");
        fs::write(&path, "rotation:\n  count_window: monthly\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
