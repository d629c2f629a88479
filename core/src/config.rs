//! Configuration loading.
//!
//! Loads `~/.config/engine-room/config.toml` (or the path in
//! `ENGINE_ROOM_CONFIG`). A missing file means defaults; every field is
//! optional.
//!
//! ```toml
//! data_dir = "/var/lib/engine-room"
//!
//! [advisory]
//! fallback_delay_ms = 5000
//! simulation_delay_ms = 1500
//! api_base_url = "https://generativelanguage.googleapis.com/v1beta/models"
//! default_model = "gemini-1.5-flash"
//! request_timeout_secs = 30
//!
//! [presentation]
//! score_animation_ms = 1000
//! typing_interval_ms = 15
//! toast_ms = 3000
//! ```

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ENGINE_ROOM_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine a data directory; set data_dir in the config")]
    NoDataDir,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineRoomConfig {
    /// Storage root. Defaults to `<XDG data dir>/engine-room`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,
}

/// Remote scoring and fallback scheduling.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryConfig {
    /// Pause between a failed remote call and the simulated fallback.
    #[serde(default = "default_fallback_delay_ms")]
    pub fallback_delay_ms: u64,

    /// Pacing delay before a simulated report resolves.
    #[serde(default = "default_simulation_delay_ms")]
    pub simulation_delay_ms: u64,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model used when settings do not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_fallback_delay_ms() -> u64 {
    5000
}

fn default_simulation_delay_ms() -> u64 {
    1500
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: default_fallback_delay_ms(),
            simulation_delay_ms: default_simulation_delay_ms(),
            api_base_url: default_api_base_url(),
            default_model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AdvisoryConfig {
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn simulation_delay(&self) -> Duration {
        Duration::from_millis(self.simulation_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Timings of the report reveal.
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_score_animation_ms")]
    pub score_animation_ms: u64,

    /// Delay between revealed summary characters.
    #[serde(default = "default_typing_interval_ms")]
    pub typing_interval_ms: u64,

    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,
}

fn default_score_animation_ms() -> u64 {
    1000
}

fn default_typing_interval_ms() -> u64 {
    15
}

fn default_toast_ms() -> u64 {
    3000
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            score_animation_ms: default_score_animation_ms(),
            typing_interval_ms: default_typing_interval_ms(),
            toast_ms: default_toast_ms(),
        }
    }
}

impl PresentationConfig {
    pub fn score_animation(&self) -> Duration {
        Duration::from_millis(self.score_animation_ms)
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms)
    }

    pub fn toast(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

impl EngineRoomConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Storage root: configured `data_dir`, else `<XDG data dir>/engine-room`.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("engine-room"))
            .ok_or(ConfigError::NoDataDir)
    }
}

/// `$ENGINE_ROOM_CONFIG`, else `<config dir>/engine-room/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("engine-room").join("config.toml"))
}
