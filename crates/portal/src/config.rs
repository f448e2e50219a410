//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SCHOOL_PORTAL_API_URL` - Backend origin (default: `http://localhost:5000`)
//! - `SCHOOL_PORTAL_STORE` - Session storage file (default: `.school-portal/storage.json`)
//! - `SCHOOL_PORTAL_TIMEOUT_SECS` - HTTP request timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_STORE_PATH: &str = ".school-portal/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client-side configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin; always ends with `/` so relative joins keep its path.
    pub api_base_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Location of the file-backed session storage.
    pub store_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(&format!("{DEFAULT_API_URL}/"))
                .unwrap_or_else(|_| unreachable!("default API URL is valid")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_env_or_default(
            "SCHOOL_PORTAL_API_URL",
            DEFAULT_API_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("SCHOOL_PORTAL_API_URL".to_string(), e))?;

        let timeout_secs = get_env_or_default(
            "SCHOOL_PORTAL_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SCHOOL_PORTAL_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let store_path =
            PathBuf::from(get_env_or_default("SCHOOL_PORTAL_STORE", DEFAULT_STORE_PATH));

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            store_path,
        })
    }

    /// Same configuration pointed at another backend origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = parse_base_url(url)
            .map_err(|e| ConfigError::InvalidEnvVar("api url".to_string(), e))?;
        Ok(self)
    }
}

/// Parse an http(s) origin and make sure its path ends with `/`.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.store_path, PathBuf::from(".school-portal/storage.json"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://api.school.example/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.school.example/v1/");
        assert_eq!(
            url.join("create-admin").unwrap().as_str(),
            "https://api.school.example/v1/create-admin"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(parse_base_url("ftp://files.example").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_with_api_url() {
        let config = ClientConfig::default()
            .with_api_url("http://127.0.0.1:9000")
            .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:9000/");
    }
}
