//! Configuration loading for Caseline services
//!
//! Resolution priority for every setting: environment variable → TOML
//! config file → compiled default. The TOML file location follows the
//! platform config directory convention (`~/.config/caseline/config.toml`
//! on Linux), overridable with `CASELINE_CONFIG`.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default upload ceiling: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default import session TTL: 1 hour
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Service configuration shared by Caseline services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Hard ceiling on uploaded file size in bytes
    pub max_upload_bytes: usize,
    /// Import session time-to-live in seconds
    pub session_ttl_secs: u64,
}

/// Optional fields as they appear in the TOML config file
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    bind_addr: Option<String>,
    database_path: Option<String>,
    max_upload_bytes: Option<usize>,
    session_ttl_secs: Option<u64>,
}

impl ServiceConfig {
    /// Resolve configuration from ENV → TOML → defaults
    pub fn resolve() -> Self {
        let toml = load_toml_config().unwrap_or_default();

        let bind_addr = std::env::var("CASELINE_BIND_ADDR")
            .ok()
            .or(toml.bind_addr)
            .unwrap_or_else(|| "127.0.0.1:5731".to_string());

        let database_path = std::env::var("CASELINE_DATABASE_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| toml.database_path.map(PathBuf::from))
            .unwrap_or_else(default_database_path);

        let max_upload_bytes = std::env::var("CASELINE_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(toml.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let session_ttl_secs = std::env::var("CASELINE_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(toml.session_ttl_secs)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Self {
            bind_addr,
            database_path,
            max_upload_bytes,
            session_ttl_secs,
        }
    }
}

/// Locate and parse the TOML config file, if one exists
fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read config failed: {}", e)))?;
    debug!("Loaded config file: {}", path.display());
    toml::from_str(&content).map_err(|e| {
        warn!("Config file {} is malformed: {}", path.display(), e);
        Error::Config(format!("Parse config failed: {}", e))
    })
}

/// Config file path: `CASELINE_CONFIG` env var, else platform config dir
fn config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CASELINE_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("caseline").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("caseline").join("caseline.db"))
        .unwrap_or_else(|| PathBuf::from("./caseline.db"))
}
