//! Resolution of the API base URL.
//!
//! The base is decided once at startup: a local development origin (or no
//! origin at all) targets the fixed local backend, anything else resolves
//! `./api` relative to the deployment origin.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

/// Base used when running against a local backend.
pub const LOCAL_API_BASE: &str = "http://localhost:8080/api";

const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid deployment origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// Use `base` as-is, without origin resolution.
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into().trim_end_matches('/').to_string())
    }

    pub fn resolve(origin: Option<&str>) -> Result<Self, ConfigError> {
        let origin = match origin.map(str::trim).filter(|o| !o.is_empty()) {
            Some(o) => o,
            None => return Ok(Self(LOCAL_API_BASE.to_string())),
        };

        let invalid = |reason: String| ConfigError::InvalidOrigin {
            origin: origin.to_string(),
            reason,
        };

        let url = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("origin has no host".to_string()))?;

        if LOCAL_HOSTS.contains(&host) {
            return Ok(Self(LOCAL_API_BASE.to_string()));
        }

        let api = url.join("./api").map_err(|e| invalid(e.to_string()))?;
        Ok(Self(api.as_str().trim_end_matches('/').to_string()))
    }

    /// Full URL for an endpoint path such as `/login`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
