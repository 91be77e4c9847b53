/// Client configuration for the Lytics API.
use std::fmt;
use std::time::Duration;

use crate::errors::LyticsError;

/// Default API host. Both `/api/...` and `/collect/...` live under it.
pub const DEFAULT_API_BASE: &str = "https://api.lytics.io";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "LIOKEY";

/// Environment variable overriding the API host.
pub const API_BASE_ENV: &str = "LIO_API_BASE";

/// Immutable configuration captured when a client is constructed.
///
/// Request headers are derived from this value on every call; nothing in it is
/// mutated after construction.
#[derive(Clone)]
pub struct LyticsConfig {
    pub api_base: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl LyticsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Point the client at another host (trailing slashes are dropped).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the API key from `LIOKEY` and, optionally, the host from `LIO_API_BASE`.
    pub fn from_env() -> Result<Self, LyticsError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LyticsError::ConfigError(format!(
                    "API key must be set in the environment variable {API_KEY_ENV}"
                ))
            })?;
        let config = Self::new(api_key);
        match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => Ok(config.with_api_base(base)),
            _ => Ok(config),
        }
    }
}

impl fmt::Debug for LyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LyticsConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &mask_key(&self.api_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Mask an API key for logs and debug output.
pub fn mask_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}
