//! Application configuration.
//!
//! Configuration comes from the environment only (a `.env` file is loaded
//! by the binary before this runs). Nothing is written back to disk.
//!
//! - `ACESSOS_ORIGIN`: deployment origin the API lives under
//! - `ACESSOS_ADMIN_USER`: prefills the admin login username

use std::path::PathBuf;

use anyhow::Result;

use crate::api::{ApiBase, ConfigError};

/// Application name used for the log directory path
pub const APP_NAME: &str = "acessos";

pub const ORIGIN_VAR: &str = "ACESSOS_ORIGIN";
pub const ADMIN_USER_VAR: &str = "ACESSOS_ADMIN_USER";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub origin: Option<String>,
    pub admin_username: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            origin: get(ORIGIN_VAR),
            admin_username: get(ADMIN_USER_VAR),
        }
    }

    pub fn api_base(&self) -> Result<ApiBase, ConfigError> {
        ApiBase::resolve(self.origin.as_deref())
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
