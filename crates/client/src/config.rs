//! Client configuration (read once at startup).

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::default_storage_path;

pub const API_URL_ENV: &str = "NOTESDESK_API_URL";
pub const STORAGE_PATH_ENV: &str = "NOTESDESK_STORAGE_PATH";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API url '{0}': expected http:// or https://")]
    InvalidApiUrl(String),

    #[error("no storage path configured and no data directory available")]
    NoStoragePath,
}

/// Where the backend lives and where the session is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base endpoint, without trailing slash.
    pub api_url: String,
    pub storage_path: PathBuf,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, storage_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: validate_api_url(api_url.into())?,
            storage_path: storage_path.into(),
        })
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (environment, test map...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("{API_URL_ENV} not set; using {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        let storage_path = match lookup(STORAGE_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_storage_path().ok_or(ConfigError::NoStoragePath)?,
        };

        Self::new(api_url, storage_path)
    }

    /// Absolute URL for an API path such as `/api/user`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

fn validate_api_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidApiUrl(raw));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_values_and_trims_trailing_slash() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.example.com/"),
            (STORAGE_PATH_ENV, "/tmp/notesdesk.json"),
        ]))
        .unwrap();

        assert_eq!(cfg.api_url, "https://api.example.com");
        assert_eq!(cfg.storage_path, PathBuf::from("/tmp/notesdesk.json"));
        assert_eq!(cfg.endpoint("/api/user"), "https://api.example.com/api/user");
        assert_eq!(cfg.endpoint("api/user"), "https://api.example.com/api/user");
    }

    #[test]
    fn defaults_api_url() {
        let cfg = ClientConfig::from_lookup(lookup(&[(STORAGE_PATH_ENV, "/tmp/s.json")])).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "ftp://files"),
            (STORAGE_PATH_ENV, "/tmp/s.json"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidApiUrl("ftp://files".to_string()));
    }
}
