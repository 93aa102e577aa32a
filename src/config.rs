//! Configuration Management
//!
//! [`ClientConfig`] is the immutable, validated connection settings every
//! request needs. [`Config`] is the optional on-disk layer the CLI merges with
//! flags and environment variables to produce one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// API username used when none is configured
pub const DEFAULT_API_USERNAME: &str = "system";

/// Validated connection settings for one Discourse site
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_key: String,
    api_username: String,
}

impl ClientConfig {
    /// Create a config using the default API username
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if api_key.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_username: DEFAULT_API_USERNAME.to_string(),
        })
    }

    pub fn with_api_username(mut self, api_username: &str) -> Self {
        self.api_username = api_username.to_string();
        self
    }

    /// Site root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_username(&self) -> &str {
        &self.api_username
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_username", &self.api_username)
            .finish()
    }
}

/// Persisted user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Site root, e.g. https://forum.example.com
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_username: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("discourse-client").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a file; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Write the config; on unix the file is owner-only since it holds the API key
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                restrict_permissions(parent, 0o700)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        // mode() only applies on creation; tighten a pre-existing file too
        restrict_permissions(path, 0o600)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Overlay values given on the command line (or via environment)
    pub fn merge(
        mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        api_username: Option<String>,
    ) -> Self {
        if base_url.is_some() {
            self.base_url = base_url;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if api_username.is_some() {
            self.api_username = api_username;
        }
        self
    }

    /// Effective API username (configured value or `system`)
    pub fn effective_api_username(&self) -> &str {
        self.api_username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_USERNAME)
    }

    /// Validate into connection settings
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("no Discourse URL configured".to_string()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("no API key configured".to_string()))?;

        Ok(ClientConfig::new(base_url, api_key)?.with_api_username(self.effective_api_username()))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults_username_and_trims_slash() {
        let config = ClientConfig::new("http://rants.example.com/", "key").unwrap();
        assert_eq!(config.base_url(), "http://rants.example.com");
        assert_eq!(config.api_username(), "system");
    }

    #[test]
    fn test_client_config_rejects_bad_input() {
        assert!(ClientConfig::new("not a url", "key").is_err());
        assert!(ClientConfig::new("ftp://rants.example.com", "key").is_err());
        assert!(ClientConfig::new("http://rants.example.com", "").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("http://rants.example.com", "super-secret-key").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = Config {
            base_url: Some("http://old.example.com".into()),
            api_key: Some("old".into()),
            api_username: None,
        };
        let merged = file.merge(None, Some("new".into()), Some("admin".into()));
        assert_eq!(merged.base_url.as_deref(), Some("http://old.example.com"));
        assert_eq!(merged.api_key.as_deref(), Some("new"));
        assert_eq!(merged.effective_api_username(), "admin");
    }

    #[test]
    fn test_to_client_config_requires_url_and_key() {
        let err = Config::default().to_client_config().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = Config {
            base_url: Some("http://rants.example.com".into()),
            api_key: Some("key".into()),
            api_username: Some(String::new()),
        };
        let client_config = config.to_client_config().unwrap();
        assert_eq!(client_config.api_username(), "system");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("discourse-client-test-{}", std::process::id()))
            .join("config.json");
        let config = Config {
            base_url: Some("http://rants.example.com".into()),
            api_key: Some("key".into()),
            api_username: Some("system".into()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("discourse-client-perms-{}", std::process::id()));
        let path = dir.join("config.json");
        let _ = std::fs::remove_dir_all(&dir);

        // pre-existing world-readable file must be tightened as well
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let config = Config {
            base_url: Some("http://rants.example.com".into()),
            api_key: Some("super-secret-key".into()),
            api_username: None,
        };
        config.save_to(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "config file mode {mode:o} exposes the API key");
        assert_eq!(Config::load_from(&path), config);

        std::fs::remove_dir_all(&dir).unwrap();
        let fresh = dir.join("nested").join("config.json");
        config.save_to(&fresh).unwrap();
        let file_mode = std::fs::metadata(&fresh).unwrap().permissions().mode();
        let dir_mode = std::fs::metadata(fresh.parent().unwrap()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o077, 0);
        assert_eq!(dir_mode & 0o077, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join("discourse-client-definitely-missing.json");
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
