//! Application settings loaded from an optional JSON file and environment variables.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECONDS, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_DATABASE_MIN_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ENV_APP_ENV,
};

/// Errors raised while building the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime environment. Drives the log format and default verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

impl Environment {
    /// Default log filter for this environment
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Local | Environment::Dev => "debug",
            Environment::Prod => "info",
        }
    }

    /// Whether logs should be emitted as JSON lines
    pub fn json_logs(&self) -> bool {
        !matches!(self, Environment::Local)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Database pool configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
            connect_timeout_seconds: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection acquire timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl HttpServerConfig {
    /// Get the full server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upper bound for a single request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Application configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub env: Environment,
    pub database: DatabaseConfig,
    pub http_server: HttpServerConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Starts from defaults, overlays the JSON file at `path` when given,
    /// then applies environment variables (including those from `.env`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;

        Ok(config)
    }

    /// Parse a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from a key lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_APP_ENV) {
            self.env = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_APP_ENV,
                value,
            })?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(value) = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = value;
        }
        if let Some(value) = parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")? {
            self.database.min_connections = value;
        }
        if let Some(value) = parse_var(&lookup, "DATABASE_CONNECT_TIMEOUT_SECONDS")? {
            self.database.connect_timeout_seconds = value;
        }

        if let Some(host) = lookup("SERVER_HOST") {
            self.http_server.host = host;
        }
        if let Some(value) = parse_var(&lookup, "SERVER_PORT")? {
            self.http_server.port = value;
        }
        if let Some(value) = parse_var(&lookup, "SERVER_REQUEST_TIMEOUT_SECONDS")? {
            self.http_server.request_timeout_seconds = value;
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}
