//! User settings, read from `<config_dir>/digital-ruler/config.json` when present.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "digital-ruler";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    /// Screen width kept free for the control panel when fitting the image
    pub reserved_panel_width: f32,
    /// Multiplier applied after fitting so the image never touches the screen edge
    pub fit_margin: f32,
    /// Used when the window system does not report a monitor size
    pub fallback_screen_size: [f32; 2],
    pub show_instructions: bool,
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            reserved_panel_width: 400.0,
            fit_margin: 0.9,
            fallback_screen_size: [1920.0, 1080.0],
            show_instructions: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl RulerConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Settings from the default location, or defaults if the file is absent or broken.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::debug!("no config directory on this platform, using defaults");
            return Self::default();
        };
        match Self::read(&path) {
            Ok(Some(config)) => {
                log::info!("loaded settings from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }
}
