use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::platform;
use super::station::{default_catalog, Station};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("station catalog is empty")]
    EmptyCatalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// `[[station]]` tables; the built-in catalog when absent.
    #[serde(default = "default_catalog", rename = "station")]
    pub stations: Vec<Station>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player executable. Looked up beside the exe and on PATH when unset.
    #[serde(default)]
    pub binary: Option<PathBuf>,
    /// How long to wait for the player to exit after asking it to terminate.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_menu_width")]
    pub menu_width: u16,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            binary: None,
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            menu_width: default_menu_width(),
        }
    }
}

impl PlayerConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }
}

const MIN_TICK_MS: u64 = 10;

fn default_stop_timeout_ms() -> u64 {
    3000
}

fn default_tick_ms() -> u64 {
    100
}

fn default_menu_width() -> u16 {
    30
}

impl Config {
    /// Load configuration. The file is only ever read, never created.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the config
    /// directory is used if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path();
                if !p.exists() {
                    tracing::debug!("no config at {}, using defaults", p.display());
                    return Ok(Self::default());
                }
                p
            }
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!(
            "loaded config {} ({} stations)",
            path.display(),
            config.stations.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            ui: UiConfig::default(),
            stations: default_catalog(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ui.tick(), Duration::from_millis(100));
        assert_eq!(config.ui.menu_width, 30);
        assert_eq!(config.player.stop_timeout(), Duration::from_secs(3));
        assert!(config.player.binary.is_none());
        assert_eq!(config.stations, default_catalog());
        assert!(Config::config_path().ends_with("tui-radio/config.toml"));
    }

    #[test]
    fn stations_replace_builtin_catalog() {
        let file = write_config(
            r#"
[ui]
menu_width = 24

[[station]]
name = "One"
url = "http://one.example/stream"

[[station]]
name = "Two"
url = "http://two.example/stream"
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.ui.menu_width, 24);
        assert_eq!(config.ui.tick_ms, 100);
        assert_eq!(
            config.stations,
            vec![
                Station::new("One", "http://one.example/stream"),
                Station::new("Two", "http://two.example/stream"),
            ]
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let file = write_config("[player]\nbinary = \"/opt/mpv/bin/mpv\"\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.player.binary.as_deref(),
            Some(Path::new("/opt/mpv/bin/mpv"))
        );
        assert_eq!(config.player.stop_timeout_ms, 3000);
        assert_eq!(config.stations.len(), 5);
    }

    #[test]
    fn empty_station_list_is_rejected() {
        let file = write_config("station = []\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::EmptyCatalog)
        ));
    }

    #[test]
    fn tiny_tick_is_clamped() {
        let ui = UiConfig {
            tick_ms: 0,
            menu_width: 30,
        };
        assert_eq!(ui.tick(), Duration::from_millis(MIN_TICK_MS));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let file = write_config("[ui\nmenu_width = ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
