//! Application configuration for the besluit-publicatie service.
//!
//! User config lives at `~/.besluit-publicatie/besluit-publicatie.toml`.
//! Missing file or missing fields fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PublicatieError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "besluit-publicatie.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".besluit-publicatie";

// ---------------------------------------------------------------------------
// Config structs (matching besluit-publicatie.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Triple store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Publishing loop settings.
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SPARQL endpoint accepting both queries and updates.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Graph the published resources and extracted data live in.
    #[serde(default = "default_graph")]
    pub graph: String,

    /// Root of the shared drive for large file content (`share://` URIs).
    #[serde(default = "default_share_dir")]
    pub share_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            graph: default_graph(),
            share_dir: default_share_dir(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8890/sparql".into()
}
fn default_graph() -> String {
    "http://mu.semte.ch/graphs/public".into()
}
fn default_share_dir() -> String {
    "/share".into()
}

/// `[publisher]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Seconds between automatic polls for unprocessed resources.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Give up on a resource after this many failed attempts.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Hours after which a resource stuck in `pending` re-enters the queue.
    #[serde(default = "default_pending_timeout_hours")]
    pub pending_timeout_hours: u32,

    /// Listen address for the HTTP trigger endpoint.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            pending_timeout_hours: default_pending_timeout_hours(),
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    300
}
fn default_max_attempts() -> u32 {
    10
}
fn default_pending_timeout_hours() -> u32 {
    3
}
fn default_listen_addr() -> String {
    "0.0.0.0:8888".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.besluit-publicatie/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PublicatieError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.besluit-publicatie/besluit-publicatie.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PublicatieError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PublicatieError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PublicatieError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PublicatieError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PublicatieError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
