//! Application configuration loaded from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Directory under the user's config dir holding all client state.
pub const APP_DIR: &str = "dreamtravel";
/// Origin of the reservation API when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const DEFAULT_CONFIG: &str = r#"# Dream Travels client configuration.

# Origin of the reservation API.
base_url = "http://localhost:5000"

# Where the bearer token and role code are stored between runs.
# session_path = "~/.config/dreamtravel/session.json"

# Directory receiving dreamtravel.log.
# log_dir = "logs"
"#;

/// Runtime settings for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote API, without a trailing slash.
    pub base_url: String,
    /// File holding the persisted session.
    pub session_path: PathBuf,
    /// Directory for log files.
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_path: config_root().join("session.json"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and `DREAMTRAVEL_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration using `path` as the optional file source.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default(
                "session_path",
                defaults.session_path.to_string_lossy().to_string(),
            )?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DREAMTRAVEL"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut loaded: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        loaded.base_url = loaded.base_url.trim_end_matches('/').to_string();
        Ok(loaded)
    }
}

/// Root directory for configuration and session files.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Location of `config.toml`.
pub fn config_path() -> PathBuf {
    config_root().join("config.toml")
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
