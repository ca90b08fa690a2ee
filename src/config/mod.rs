//! Application configuration module
//!
//! Handles the optional config file, environment variables and
//! application-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{Config, ConfigError, DatabaseConfig, Environment, HttpServerConfig};
