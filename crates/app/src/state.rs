use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::session::SESSION_FILE_NAME;

pub const APP_NAME: &str = "fileflow";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the FileFlow backend
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Default log directive, overridden by `--log-level` and `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Quiet period before a search query is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

pub fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("hardcoded URL must parse")
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_search_debounce_ms() -> u64 {
    common::search::DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            log_level: default_log_level(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the fileflow directory (~/.fileflow)
    pub fileflow_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the persisted session
    pub session_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the fileflow directory path (custom or default ~/.fileflow)
    pub fn fileflow_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new fileflow state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let fileflow_dir = Self::fileflow_dir(custom_path)?;

        if fileflow_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&fileflow_dir)?;

        let config = config.unwrap_or_default();
        let config_path = fileflow_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            session_path: fileflow_dir.join(SESSION_FILE_NAME),
            fileflow_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the fileflow directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let fileflow_dir = Self::fileflow_dir(custom_path)?;

        if !fileflow_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = fileflow_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            session_path: fileflow_dir.join(SESSION_FILE_NAME),
            fileflow_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("fileflow directory not initialized. Run `fileflow init` first")]
    NotInitialized,

    #[error("fileflow directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
