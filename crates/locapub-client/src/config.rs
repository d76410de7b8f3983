//! Client configuration loaded from environment variables.
//!
//! All settings have defaults pointing at a local development backend, so the
//! client starts with zero configuration.

use std::path::PathBuf;

use locapub_shared::constants::{DEFAULT_API_BASE_URL, DEFAULT_CACHE_QUOTA_BYTES, DEFAULT_OWNER};

/// Where the session cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process map, gone when the process exits.
    Memory,
    /// SQLite file; `None` picks the platform cache directory.
    Sqlite { path: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the webhook backend.
    /// Env: `LOCAPUB_API_BASE_URL`
    pub api_base_url: String,

    /// Owner written into records and used to filter lists.
    /// Env: `LOCAPUB_USER`
    pub user: String,

    /// Env: `LOCAPUB_CACHE` (`memory` | `sqlite`), `LOCAPUB_CACHE_PATH`
    pub cache: CacheBackend,

    /// Env: `LOCAPUB_CACHE_QUOTA_BYTES`
    pub cache_quota_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user: DEFAULT_OWNER.to_string(),
            cache: CacheBackend::Memory,
            cache_quota_bytes: DEFAULT_CACHE_QUOTA_BYTES,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("LOCAPUB_API_BASE_URL") {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_base_url = url;
            } else {
                tracing::warn!(value = %url, "Invalid LOCAPUB_API_BASE_URL, using default");
            }
        }

        if let Some(user) = lookup("LOCAPUB_USER") {
            if !user.trim().is_empty() {
                config.user = user.trim().to_string();
            }
        }

        let cache_path = lookup("LOCAPUB_CACHE_PATH").map(PathBuf::from);
        match lookup("LOCAPUB_CACHE").as_deref() {
            None | Some("memory") => {}
            Some("sqlite") => config.cache = CacheBackend::Sqlite { path: cache_path },
            Some(other) => {
                tracing::warn!(value = other, "Unknown LOCAPUB_CACHE backend, using memory");
            }
        }

        if let Some(val) = lookup("LOCAPUB_CACHE_QUOTA_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.cache_quota_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid LOCAPUB_CACHE_QUOTA_BYTES, using default"),
            }
        }

        config
    }
}
