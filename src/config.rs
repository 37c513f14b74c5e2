use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::MAX_SESSION_TTL_HOURS;

/// Configuration for the blog server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Directory uploaded images are stored in and served from
    pub media_dir: String,
    /// How long a login lasts, in hours
    pub session_ttl_hours: i64,
    /// Directory for JSON log files; logs only go to stdout when unset
    pub log_dir: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub media_dir: Option<String>,
    #[serde(default)]
    pub session_ttl_hours: Option<i64>,
    #[serde(default)]
    pub log_dir: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "blogpress", about = "A blog with public and private posts")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[clap(long, env = "BLOGPRESS_BIND")]
    pub bind_address: Option<String>,

    /// Directory for uploaded images
    #[clap(long, env = "BLOGPRESS_MEDIA_DIR")]
    pub media_dir: Option<String>,

    /// Session lifetime in hours
    #[clap(long, env = "BLOGPRESS_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<i64>,

    /// Directory for JSON log files
    #[clap(long, env = "BLOGPRESS_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Debug mode
    #[clap(long, env = "BLOGPRESS_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            media_dir: update.media_dir.unwrap_or(self.media_dir),
            session_ttl_hours: update.session_ttl_hours.unwrap_or(self.session_ttl_hours),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the session lifetime
    ///
    /// Values below one hour or above [`MAX_SESSION_TTL_HOURS`] fall back to
    /// a day.
    pub fn session_ttl(&self) -> chrono::Duration {
        match self.session_ttl_hours {
            hours @ 1..=MAX_SESSION_TTL_HOURS => chrono::Duration::hours(hours),
            hours => {
                warn!("session_ttl_hours {} is out of range, using 24", hours);
                chrono::Duration::hours(24)
            }
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("blog.db".to_string(), |path| {
        path.join("blog.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        bind_address: "127.0.0.1:8000".to_string(),
        media_dir: "media".to_string(),
        session_ttl_hours: 24 * 14,
        log_dir: None,
    }
}

/// Loads configuration from a TOML file
///
/// A missing file is not an error and yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, ConfigError> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let config = toml::from_str::<ConfigUpdate>(&content)?;
    info!("Loaded configuration from {:?}", config_path);
    Ok(config)
}

/// Path of `config.toml` in the XDG config directory, whether or not it exists
pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "blogpress", "blogpress").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Reads only `log_dir` from a config file
///
/// Runs before the subscriber is installed, so an unreadable or malformed
/// file yields `None` here and is reported by [`get_config_with`] later.
pub fn log_dir_from_file(config_path: Option<PathBuf>) -> Option<String> {
    let content = fs::read_to_string(config_path?).ok()?;
    toml::from_str::<ConfigUpdate>(&content).ok()?.log_dir
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        media_dir: args.media_dir,
        session_ttl_hours: args.session_ttl_hours,
        log_dir: args.log_dir,
    }
}

/// The XDG config directory, if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let path = match ProjectDirs::from("com", "blogpress", "blogpress") {
        Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            return None;
        }
    };

    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Combines defaults, the config file and `overrides`, in order of
/// increasing precedence
pub fn get_config_with(overrides: ConfigUpdate) -> Config {
    let config_path = get_config_dir_path();
    let base = base_config(config_path.clone());

    let from_file = match config_from_file(config_path.map(|p| p.join("config.toml"))) {
        Ok(update) => update,
        Err(e) => {
            warn!("{}", e);
            ConfigUpdate::default()
        }
    };

    let config = base.apply_update(from_file).apply_update(overrides);

    info!(
        "Final configuration: database_url={}, bind_address={}, media_dir={}, session_ttl={}h",
        config.database_url, config.bind_address, config.media_dir, config.session_ttl_hours
    );

    config
}

/// Gets the complete configuration by combining defaults with values from
/// the config file, environment variables and command line arguments
pub fn get_config(args: CliArgs) -> Config {
    get_config_with(config_from_args(args))
}
