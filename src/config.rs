// Booking API connection settings
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_OFFERS_PATH: &str = "/api/shared-bookings";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub offers_path: String,
    pub api_key: Option<String>,
    // No timeout unless set
    pub timeout_ms: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            offers_path: DEFAULT_OFFERS_PATH.to_string(),
            api_key: None,
            timeout_ms: None,
        }
    }
}

impl SourceConfig {
    /// Build the config from environment variables.
    ///
    /// All optional:
    /// - `BOOKING_API_BASE_URL`: default `http://localhost:8080`
    /// - `BOOKING_OFFERS_PATH`: default `/api/shared-bookings`
    /// - `BOOKING_API_KEY`: sent as a bearer token when present
    /// - `BOOKING_API_TIMEOUT_MS`: request timeout, none when absent
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_ms = match lookup("BOOKING_API_TIMEOUT_MS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!("BOOKING_API_TIMEOUT_MS is not a number: {raw}"))
            })?),
            None => None,
        };

        let config = Self {
            base_url: lookup("BOOKING_API_BASE_URL").unwrap_or(defaults.base_url),
            offers_path: lookup("BOOKING_OFFERS_PATH").unwrap_or(defaults.offers_path),
            api_key: lookup("BOOKING_API_KEY").filter(|key| !key.is_empty()),
            timeout_ms,
        };

        config.validate()
    }

    /// Check the settings and normalize the base URL.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if !self.offers_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "offers_path must start with '/': {}",
                self.offers_path
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()));
        }

        Ok(self)
    }

    pub fn offers_url(&self) -> String {
        format!("{}{}", self.base_url, self.offers_path)
    }
}
