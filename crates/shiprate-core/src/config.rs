//! Carrier credentials and endpoint configuration.
//!
//! # Environment Variables
//!
//! | Setting | Primary Env Var | Fallback Env Var | Default |
//! |---------|-----------------|------------------|---------|
//! | Client id | `SHIPRATE_UPS_CLIENT_ID` | `UPS_CLIENT_ID` | required |
//! | Client secret | `SHIPRATE_UPS_CLIENT_SECRET` | `UPS_CLIENT_SECRET` | required |
//! | Account number | `SHIPRATE_UPS_ACCOUNT_NUMBER` | `UPS_ACCOUNT_NUMBER` | none |
//! | Environment | `SHIPRATE_UPS_ENVIRONMENT` | `UPS_ENVIRONMENT` | `sandbox` |
//! | API base URL | `SHIPRATE_UPS_BASE_URL` | `UPS_BASE_URL` | per environment |
//! | OAuth token URL | `SHIPRATE_UPS_TOKEN_URL` | `UPS_TOKEN_URL` | `{base}/security/v1/oauth/token` |
//! | Rating API version | `SHIPRATE_UPS_RATE_API_VERSION` | `UPS_RATE_API_VERSION` | `v2403` |
//! | Rate timeout (ms) | `SHIPRATE_UPS_RATE_TIMEOUT_MS` | `UPS_RATE_TIMEOUT_MS` | `15000` |
//! | Auth timeout (ms) | `SHIPRATE_UPS_AUTH_TIMEOUT_MS` | `UPS_AUTH_TIMEOUT_MS` | `10000` |
//! | Token refresh buffer (s) | `SHIPRATE_UPS_TOKEN_REFRESH_BUFFER_SECS` | `UPS_TOKEN_REFRESH_BUFFER_SECS` | `60` |

use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_RATE_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 60;
pub const DEFAULT_RATE_API_VERSION: &str = "v2403";

/// Configuration loading/validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting '{name}'")]
    Missing { name: &'static str },
    #[error("setting '{name}' must be an http(s) URL: '{value}'")]
    InvalidUrl { name: &'static str, value: String },
    #[error("setting '{name}' has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Carrier API deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarrierEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl CarrierEnvironment {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://wwwcie.ups.com",
            Self::Production => "https://onlinetools.ups.com",
        }
    }
}

impl FromStr for CarrierEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "cie" | "test" => Ok(Self::Sandbox),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue {
                name: "UPS_ENVIRONMENT",
                value: other.to_owned(),
            }),
        }
    }
}

/// Settings for one carrier integration.
#[derive(Clone, PartialEq, Eq)]
pub struct CarrierConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub token_url: String,
    pub rate_api_version: String,
    pub account_number: Option<String>,
    pub rate_timeout_ms: u64,
    pub auth_timeout_ms: u64,
    pub refresh_buffer_secs: u64,
}

impl std::fmt::Debug for CarrierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("rate_api_version", &self.rate_api_version)
            .field("account_number", &self.account_number)
            .field("rate_timeout_ms", &self.rate_timeout_ms)
            .field("auth_timeout_ms", &self.auth_timeout_ms)
            .field("refresh_buffer_secs", &self.refresh_buffer_secs)
            .finish()
    }
}

impl CarrierConfig {
    /// Config pointing at `environment` with every optional setting at its
    /// default.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        environment: CarrierEnvironment,
    ) -> Self {
        Self::with_base_url(client_id, client_secret, environment.base_url())
    }

    pub fn with_base_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: default_token_url(&base_url),
            base_url,
            rate_api_version: String::from(DEFAULT_RATE_API_VERSION),
            account_number: None,
            rate_timeout_ms: DEFAULT_RATE_TIMEOUT_MS,
            auth_timeout_ms: DEFAULT_AUTH_TIMEOUT_MS,
            refresh_buffer_secs: DEFAULT_REFRESH_BUFFER_SECS,
        }
    }

    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeouts(mut self, rate_timeout_ms: u64, auth_timeout_ms: u64) -> Self {
        self.rate_timeout_ms = rate_timeout_ms;
        self.auth_timeout_ms = auth_timeout_ms;
        self
    }

    pub fn with_refresh_buffer_secs(mut self, secs: u64) -> Self {
        self.refresh_buffer_secs = secs;
        self
    }

    /// Loads settings from the process environment and validates them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |suffix: &str| {
            lookup(&format!("SHIPRATE_UPS_{suffix}"))
                .or_else(|| lookup(&format!("UPS_{suffix}")))
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let environment = read("ENVIRONMENT")
            .map(|value| value.parse::<CarrierEnvironment>())
            .transpose()?
            .unwrap_or_default();
        let base_url = read("BASE_URL").unwrap_or_else(|| environment.base_url().to_owned());

        let mut config = Self::with_base_url(
            read("CLIENT_ID").unwrap_or_default(),
            read("CLIENT_SECRET").unwrap_or_default(),
            base_url,
        );
        if let Some(token_url) = read("TOKEN_URL") {
            config.token_url = token_url;
        }
        if let Some(version) = read("RATE_API_VERSION") {
            config.rate_api_version = version;
        }
        config.account_number = read("ACCOUNT_NUMBER");
        if let Some(value) = read("RATE_TIMEOUT_MS") {
            config.rate_timeout_ms = parse_number("UPS_RATE_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read("AUTH_TIMEOUT_MS") {
            config.auth_timeout_ms = parse_number("UPS_AUTH_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read("TOKEN_REFRESH_BUFFER_SECS") {
            config.refresh_buffer_secs = parse_number("UPS_TOKEN_REFRESH_BUFFER_SECS", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects configs that cannot possibly authenticate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "UPS_CLIENT_ID",
            });
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "UPS_CLIENT_SECRET",
            });
        }
        validate_url("UPS_BASE_URL", &self.base_url)?;
        validate_url("UPS_TOKEN_URL", &self.token_url)?;
        if self.rate_api_version.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "UPS_RATE_API_VERSION",
            });
        }
        if self.rate_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "UPS_RATE_TIMEOUT_MS",
                value: String::from("0"),
            });
        }
        if self.auth_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "UPS_AUTH_TIMEOUT_MS",
                value: String::from("0"),
            });
        }
        Ok(())
    }

    /// Rating endpoint for a request option (`Shop` or `Rate`).
    pub fn rate_url(&self, request_option: &str) -> String {
        format!(
            "{}/api/rating/{}/{}",
            self.base_url, self.rate_api_version, request_option
        )
    }
}

fn default_token_url(base_url: &str) -> String {
    format!("{base_url}/security/v1/oauth/token")
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let has_host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidUrl {
            name,
            value: value.to_owned(),
        });
    }
    Ok(())
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_owned(),
    })
}
