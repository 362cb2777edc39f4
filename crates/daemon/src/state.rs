use std::{fs, path::PathBuf};

use common::archive::{HiddenPolicy, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "gophernest";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOGS_DIR_NAME: &str = "logs";

/// Environment variable holding the token signing secret.
pub const JWT_SECRET_ENV: &str = "GOPHERNEST_JWT_SECRET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Directory listed when a client does not name one
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Which dot-prefixed entries are left out of archives
    #[serde(default)]
    pub hidden_policy: HiddenPolicy,
    /// Deepest directory nesting expanded into an archive
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Refuse to archive anything outside `root`
    #[serde(default)]
    pub confine_to_root: bool,
    /// Origins allowed to call the API from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Lifetime of tokens minted with `gophernest token`
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_api_port() -> u16 {
    5000
}

fn default_root() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3100".to_string()]
}

fn default_token_ttl_days() -> i64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            root: default_root(),
            hidden_policy: HiddenPolicy::default(),
            max_depth: default_max_depth(),
            confine_to_root: false,
            allowed_origins: default_allowed_origins(),
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the config directory (~/.gophernest)
    pub config_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Default location for rolling log files
    pub logs_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the config directory path (custom or default ~/.gophernest)
    pub fn config_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new config directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let config_dir = Self::config_dir(custom_path)?;

        if config_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&config_dir)?;

        let logs_path = config_dir.join(LOGS_DIR_NAME);
        fs::create_dir_all(&logs_path)?;

        let config = config.unwrap_or_default();
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            config_dir,
            config_path,
            logs_path,
            config,
        })
    }

    /// Load existing state from the config directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let config_dir = Self::config_dir(custom_path)?;

        if !config_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            logs_path: config_dir.join(LOGS_DIR_NAME),
            config_dir,
            config_path,
            config,
        })
    }

    /// Read the token signing secret from the environment
    pub fn jwt_secret() -> Option<String> {
        std::env::var(JWT_SECRET_ENV)
            .ok()
            .filter(|secret| !secret.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gophernest directory not initialized. Run 'gophernest init' first")]
    NotInitialized,

    #[error("gophernest directory already initialized")]
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
