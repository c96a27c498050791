use std::{env, fs, io::ErrorKind};

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Environment variable pointing at the JSON config file.
pub const CONFIG_PATH_ENV: &str = "BRANCH_DIRECTORY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Runtime configuration, read from a JSON file.
///
/// Every field is optional in the file; anything left out takes the value from
/// `Config::default()`. Without an `admin_token` all administrative endpoints
/// answer 401.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: String,
    pub bind_address: String,
    pub admin_token: Option<String>,
    pub default_locale: String,
    /// IANA name of the zone the stored opening hours are expressed in.
    pub timezone: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "branches.db".to_string(),
            bind_address: "127.0.0.1:7878".to_string(),
            admin_token: None,
            default_locale: "en".to_string(),
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_config(config: &str) -> AppResult<Self> {
        serde_json::from_str(config)
            .map_err(|err| AppError::Config(format!("Could not deserialize.\n{}", err)))
    }

    /// Loads the file named by `BRANCH_DIRECTORY_CONFIG`, or `config.json`.
    /// A missing file is not an error.
    pub fn load() -> AppResult<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_config(&text),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No config at '{}', using defaults", path);
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn timezone(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Config(format!("Unknown timezone '{}': {}", self.timezone, err)))
    }
}
