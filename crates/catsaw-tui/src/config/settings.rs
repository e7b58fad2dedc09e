use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use catsaw_logs::{ControllerOptions, DEFAULT_RESTART_TAG, MalformedPolicy};

const CATSAW_DIR: &str = ".catsaw";
const CONFIG_FILENAME: &str = "config.toml";

/// Application settings (~/.catsaw/config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub adb: AdbSettings,

    #[serde(default)]
    pub filter: FilterSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdbSettings {
    /// adb executable, looked up in PATH unless absolute
    #[serde(default = "default_adb_path")]
    pub path: String,
}

impl Default for AdbSettings {
    fn default() -> Self {
        Self {
            path: default_adb_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// Tag of the records that announce process starts and deaths
    #[serde(default = "default_restart_tag")]
    pub restart_tag: String,

    #[serde(default)]
    pub malformed: MalformedPolicy,

    #[serde(default)]
    pub freeze_on_match: bool,

    #[serde(default = "default_true")]
    pub count_suppressed_before_freeze: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            restart_tag: default_restart_tag(),
            malformed: MalformedPolicy::default(),
            freeze_on_match: false,
            count_suppressed_before_freeze: true,
        }
    }
}

impl FilterSettings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            restart_tag: self.restart_tag.clone(),
            malformed: self.malformed,
            freeze_on_match: self.freeze_on_match,
            count_suppressed_before_freeze: self.count_suppressed_before_freeze,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSettings {
    /// Rendered lines kept for scrolling back
    #[serde(default = "default_scrollback")]
    pub scrollback: usize,

    #[serde(default = "default_true")]
    pub show_status: bool,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            scrollback: default_scrollback(),
            show_status: true,
            tick_rate_ms: default_tick_rate(),
        }
    }
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_restart_tag() -> String {
    DEFAULT_RESTART_TAG.to_string()
}

fn default_true() -> bool {
    true
}

fn default_scrollback() -> usize {
    10_000
}

fn default_tick_rate() -> u64 {
    250
}

/// Default location of the settings file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CATSAW_DIR).join(CONFIG_FILENAME))
}

/// Load settings from the given file
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(config_path: &Path) -> Settings {
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
