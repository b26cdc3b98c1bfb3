//! Configuration for the Staffroom client data layer.
//!
//! Everything has a local-development default, so `ClientConfig::default()`
//! is a working configuration. `from_env` layers environment variables (with
//! `.env` support) over the defaults, `from_file` layers a TOML file.

use serde::Deserialize;
use staffroom_core::{ApiError, Result};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Base URL the backend serves the API on during local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

/// Name of the session cookie the backend sets on login.
pub const DEFAULT_COOKIE_NAME: &str = "token";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_SECS: u64 = 30;
const DEFAULT_CACHE_GRACE_SECS: u64 = 60;

/// Runtime configuration for the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root every endpoint path is resolved against.
    pub base_url: Url,
    /// Hard deadline for a single HTTP request.
    pub request_timeout: Duration,
    /// Interval for the notifications polling subscription.
    pub notifications_poll_interval: Duration,
    /// How long an unsubscribed cache entry survives before eviction.
    pub cache_grace: Duration,
    /// Cookie carrying the session token.
    pub cookie_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            notifications_poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            cache_grace: Duration::from_secs(DEFAULT_CACHE_GRACE_SECS),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads a `.env` file when present. Unset or unparseable variables warn
    /// and keep the default rather than failing startup.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = match env::var("STAFFROOM_API_URL") {
            Ok(raw) => Url::parse(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Invalid STAFFROOM_API_URL, using default");
                default_base_url()
            }),
            Err(_) => default_base_url(),
        };

        Self {
            base_url,
            request_timeout: Duration::from_secs(env_or(
                "STAFFROOM_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            notifications_poll_interval: Duration::from_secs(env_or(
                "STAFFROOM_POLL_INTERVAL_SECS",
                DEFAULT_POLL_SECS,
            )),
            cache_grace: Duration::from_secs(env_or(
                "STAFFROOM_CACHE_GRACE_SECS",
                DEFAULT_CACHE_GRACE_SECS,
            )),
            cookie_name: env::var("STAFFROOM_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string()),
        }
    }

    /// Load configuration from a TOML file layered over the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ApiError::configuration(format!("Cannot read config file: {e}")))?;
        let file: FileConfig = toml::from_str(&content)
            .map_err(|e| ApiError::configuration(format!("Cannot parse config file: {e}")))?;

        let mut config = Self::default();
        if let Some(raw) = file.base_url {
            config.base_url = Url::parse(&raw)
                .map_err(|e| ApiError::configuration(format!("Invalid base_url: {e}")))?;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.notifications_poll_secs {
            config.notifications_poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.cache_grace_secs {
            config.cache_grace = Duration::from_secs(secs);
        }
        if let Some(name) = file.cookie_name {
            config.cookie_name = name;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ApiError::configuration(format!(
                    "Unsupported base URL scheme: {other}"
                )));
            }
        }
        if self.base_url.host_str().is_none() {
            return Err(ApiError::configuration("Base URL has no host"));
        }
        if self.request_timeout.is_zero() {
            return Err(ApiError::configuration("Request timeout must be non-zero"));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(ApiError::configuration("Cookie name must be non-empty"));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.notifications_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_cache_grace(mut self, grace: Duration) -> Self {
        self.cache_grace = grace;
        self
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }
}

/// Partial shape of the TOML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    notifications_poll_secs: Option<u64>,
    cache_grace_secs: Option<u64>,
    cookie_name: Option<String>,
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn env_or<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default");
            default
        }),
        Err(_) => default,
    }
}
