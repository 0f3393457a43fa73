/// Service configuration loader - parses climate.toml
///
/// Keeps deployment details (listen address, dataset location, window
/// length) out of the code. Every field has a default, so the file itself
/// is optional.
///
/// Precedence, lowest to highest: built-in defaults, `climate.toml`,
/// `DATABASE_URL` (environment or `.env`), command-line flags.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working
/// directory.
pub const DEFAULT_CONFIG_PATH: &str = "climate.toml";

/// Where the dataset lives when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://Resources/hawaii.sqlite";

/// Accepted range for `[query].lookback_days` (one day to a century).
pub const MIN_LOOKBACK_DAYS: i64 = 1;
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "Invalid {path}: [query].lookback_days = {value} is outside {}..={}",
        MIN_LOOKBACK_DAYS,
        MAX_LOOKBACK_DAYS
    )]
    LookbackOutOfRange { path: PathBuf, value: i64 },
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Request worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            workers: 4,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite://PATH`, `postgres://…` or `postgresql://…`
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Length of the trailing window used by /precipitation and /tobs
    pub lookback_days: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { lookback_days: 365 }
    }
}

/// Parses configuration from a TOML string and checks value ranges.
pub fn parse_config(contents: &str, path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let lookback_days = config.query.lookback_days;
    if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&lookback_days) {
        return Err(ConfigError::LookbackOutOfRange {
            path: path.to_path_buf(),
            value: lookback_days,
        });
    }
    Ok(config)
}

/// Loads configuration from `path`. A missing file yields the defaults; an
/// unreadable or malformed one is an error.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("{} not found, using default configuration", path.display());
            return Ok(ServiceConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_config(&contents, path)
}

/// Loads configuration and applies `DATABASE_URL` from the environment
/// (after reading `.env`, if present).
pub fn load_with_env(path: &Path) -> Result<ServiceConfig, ConfigError> {
    dotenv::dotenv().ok();
    let mut config = load_config(path)?;
    if let Ok(url) = env::var("DATABASE_URL") {
        config.database.url = url;
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
