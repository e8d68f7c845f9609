use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::urls::{Environment, StorageConfig, DEFAULT_REGION};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("unknown APP_ENV value: {0}")]
    Environment(String),
    #[error("invalid {name}: {value}")]
    Number { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub environment: Environment,
    pub storage: StorageConfig,
    pub port: u16,
    pub request_timeout: Duration,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("BACKEND_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());

        let environment = match lookup("APP_ENV") {
            Some(v) => v.parse().map_err(|_| ConfigError::Environment(v))?,
            None => Environment::Development,
        };

        let storage = StorageConfig {
            bucket: lookup("S3_BUCKET_NAME")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            region: lookup("S3_REGION")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.into()),
        };

        let port = parse_number(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        let timeout =
            parse_number(&lookup, "REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let static_dir = lookup("STATIC_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.into())
            .into();

        Ok(Config {
            backend_url,
            environment,
            storage,
            port,
            request_timeout: Duration::from_secs(timeout),
            static_dir,
        })
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Number { name, value }),
    }
}
