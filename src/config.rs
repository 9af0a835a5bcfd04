use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::storage::default_data_dir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    #[serde(default)]
    pub default_view: DefaultView,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where favorites are stored; defaults to `~/.config/holocron`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    #[default]
    Films,
    People,
    Favorites,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tick_rate_fps: default_tick_rate(),
            default_view: DefaultView::default(),
            request_timeout_secs: default_request_timeout_secs(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/holocron/config.toml"))
}

pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        return AppConfig::default();
    };

    let Ok(contents) = fs::read_to_string(&path) else {
        return AppConfig::default();
    };

    parse_config(&contents)
}

fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("ignoring invalid config: {e}");
        AppConfig::default()
    })
}
