//! Configuration loading for CallQA services
//!
//! Resolution priority: environment variables (`CALLQA_*`) → TOML config
//! file (`CALLQA_CONFIG` path, else the platform config directory) →
//! compiled defaults. Defaults work out of the box for local use.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Service configuration, loadable from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// SQLite database file path
    pub database_path: PathBuf,

    /// Directory where uploaded call audio is stored
    pub upload_dir: PathBuf,

    /// Transcription collaborator endpoint
    pub transcription_url: String,

    /// AI analysis collaborator endpoint
    pub analysis_url: String,

    /// API key for the AI collaborators, if the deployment requires one
    pub api_key: Option<String>,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,

    /// Age after which a non-terminal record is force-failed by the reaper
    pub stale_after_seconds: u64,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5741".to_string(),
            database_path: PathBuf::from("callqa.db"),
            upload_dir: PathBuf::from("uploads"),
            transcription_url: "http://127.0.0.1:8090/v1/transcribe".to_string(),
            analysis_url: "http://127.0.0.1:8091/v1/analyze".to_string(),
            api_key: None,
            max_upload_bytes: 25 * 1024 * 1024,
            stale_after_seconds: 900,
        }
    }
}

impl TomlConfig {
    /// Load configuration with ENV → TOML → default resolution
    pub fn load() -> Result<TomlConfig> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                info!("No config file at {}, using defaults", path.display());
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                TomlConfig::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {} failed: {e}", path.display())))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("parse {} failed: {e}", path.display())))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Environment variables take priority over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CALLQA_BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Ok(v) = std::env::var("CALLQA_DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CALLQA_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CALLQA_TRANSCRIPTION_URL") {
            self.transcription_url = v;
        }
        if let Ok(v) = std::env::var("CALLQA_ANALYSIS_URL") {
            self.analysis_url = v;
        }
        if let Ok(v) = std::env::var("CALLQA_API_KEY") {
            self.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("CALLQA_MAX_UPLOAD_BYTES") {
            match v.parse() {
                Ok(n) => self.max_upload_bytes = n,
                Err(_) => warn!("Ignoring non-numeric CALLQA_MAX_UPLOAD_BYTES: {v}"),
            }
        }
        if let Ok(v) = std::env::var("CALLQA_STALE_AFTER_SECONDS") {
            match v.parse() {
                Ok(n) => self.stale_after_seconds = n,
                Err(_) => warn!("Ignoring non-numeric CALLQA_STALE_AFTER_SECONDS: {v}"),
            }
        }
    }
}

/// Config file path: `CALLQA_CONFIG` env var, else the platform config dir
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CALLQA_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("callqa").join("config.toml"))
}
