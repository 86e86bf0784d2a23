//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use rohlikctl_client::Credentials;

use crate::error::EngineError;

/// Environment variable consulted for the account password before the
/// config file value.
pub const PASSWORD_ENV: &str = "ROHLIKCTL_PASSWORD";

/// Shop front the account lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Site {
    /// Rohlik.cz (Czech Republic).
    #[default]
    RohlikCz,
    /// Knuspr.de (Germany).
    KnusprDe,
}

impl Site {
    /// Base URL for this shop front.
    pub fn base_url(self) -> &'static str {
        match self {
            Site::RohlikCz => "https://www.rohlik.cz",
            Site::KnusprDe => "https://www.knuspr.de",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shop front to poll.
    #[serde(default)]
    pub site: Site,
    /// Explicit base URL, overriding the site selection.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Login password. Prefer the `ROHLIKCTL_PASSWORD` environment
    /// variable over storing it here.
    #[serde(default)]
    pub password: Option<String>,
    /// Refresh interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Transport retry attempts per request.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

fn default_refresh_interval() -> u64 {
    600
}

fn default_request_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::default(),
            base_url: None,
            email: String::new(),
            password: None,
            refresh_interval_secs: default_refresh_interval(),
            request_timeout_secs: default_request_timeout(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rohlikctl")
            .join("config.json")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, EngineError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path. A missing file yields
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// The effective base URL: explicit override, otherwise the site's.
    pub fn resolved_base_url(&self) -> Result<String, EngineError> {
        match &self.base_url {
            Some(raw) => {
                let parsed = url::Url::parse(raw)
                    .map_err(|e| EngineError::InvalidConfig(format!("base_url: {e}")))?;
                Ok(parsed.as_str().trim_end_matches('/').to_string())
            }
            None => Ok(self.site.base_url().to_string()),
        }
    }

    /// Resolves login credentials, consulting the environment first.
    pub fn credentials(&self) -> Result<Credentials, EngineError> {
        if self.email.is_empty() {
            return Err(EngineError::MissingCredentials("email not set".to_string()));
        }

        let password = std::env::var(PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| self.password.clone())
            .ok_or_else(|| {
                EngineError::MissingCredentials(format!(
                    "password not set (config file or {PASSWORD_ENV})"
                ))
            })?;

        Ok(Credentials::new(self.email.clone(), password))
    }

    /// Refresh interval as a duration.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_rohlik() {
        let config = Config::default();
        assert_eq!(config.site, Site::RohlikCz);
        assert_eq!(config.resolved_base_url().unwrap(), "https://www.rohlik.cz");
        assert_eq!(config.refresh_interval_secs, 600);
    }

    #[test]
    fn explicit_base_url_wins() {
        let config = Config {
            site: Site::KnusprDe,
            base_url: Some("https://staging.example.com/".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolved_base_url().unwrap(),
            "https://staging.example.com"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = Config {
            base_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.resolved_base_url(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_email_fails_credential_resolution() {
        let config = Config::default();
        assert!(matches!(
            config.credentials(),
            Err(EngineError::MissingCredentials(_))
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            site: Site::KnusprDe,
            email: "t@example.com".to_string(),
            refresh_interval_secs: 120,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.site, Site::KnusprDe);
        assert_eq!(loaded.email, "t@example.com");
        assert_eq!(loaded.refresh_interval_secs, 120);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded.site, Site::RohlikCz);
    }
}
