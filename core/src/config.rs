//! Client configuration.
//!
//! A `ClientConfig` is an explicit value: build it in code, deserialize it
//! from a config file, or read it from `PAYROLL_API_*` environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, ApiResult};

pub const ENV_URL: &str = "PAYROLL_API_URL";
pub const ENV_TIMEOUT: &str = "PAYROLL_API_TIMEOUT";
pub const ENV_VERSION: &str = "PAYROLL_API_VERSION";
pub const ENV_KEY: &str = "PAYROLL_API_KEY";
pub const ENV_TENANT: &str = "PAYROLL_API_TENANT";

pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// Backend protocol version sent as `X-Version: major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ApiError::Config(format!("invalid api version '{s}', expected major.minor"));
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Connection settings for one backend endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request deadline in milliseconds.
    pub timeout_ms: u64,
    pub api_version: Option<ApiVersion>,
    pub api_key: Option<String>,
    /// Tenant identifier sent in the tenant-scoping header.
    pub tenant: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_SECS * 1000,
            api_version: None,
            api_key: None,
            tenant: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read the configuration from `PAYROLL_API_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let base_url = lookup(ENV_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_URL} is not set")))?;

        let timeout_secs: u64 = match lookup(ENV_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("invalid {ENV_TIMEOUT} '{raw}'")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let api_version = lookup(ENV_VERSION).map(|raw| raw.parse()).transpose()?;

        Ok(Self {
            base_url,
            timeout_ms: timeout_secs.saturating_mul(1000),
            api_version,
            api_key: lookup(ENV_KEY),
            tenant: lookup(ENV_TENANT),
        })
    }

    /// Check the settings a client cannot work without.
    pub fn validate(&self) -> ApiResult<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base url must be an http(s) address, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ApiError::Config("timeout must be at least one millisecond".to_string()));
        }
        Ok(())
    }
}
