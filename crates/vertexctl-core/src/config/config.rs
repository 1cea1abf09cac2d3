//! Profile file loading, saving and resolution
//!
//! ```toml
//! default_profile = "dev"
//!
//! [profiles.dev]
//! project = "my-project"
//! location = "us-central1"
//! access_token = "${GOOGLE_OAUTH_ACCESS_TOKEN}"
//!
//! [profiles.dev.polling]
//! initial_delay_ms = 1000
//! timeout_secs = 1800
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::client::DEFAULT_LOCATION;
use crate::lro::PollConfig;

/// Environment variable that overrides any stored access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Environment variable that overrides the profile project
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";
/// Environment variable that overrides the profile location
pub const LOCATION_ENV: &str = "GOOGLE_CLOUD_LOCATION";

/// Top-level config file
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One named project/location pairing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub project: String,
    #[serde(default = "default_location")]
    pub location: String,
    /// Plaintext token, `${ENV}` reference or `keyring:` reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Endpoint override (private service connect, proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling: Option<PollingConfig>,
}

/// Operation polling cadence as written in the config file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollingConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            timeout_secs: None,
        }
    }
}

impl From<&PollingConfig> for PollConfig {
    fn from(polling: &PollingConfig) -> Self {
        PollConfig {
            initial_delay: Duration::from_millis(polling.initial_delay_ms),
            multiplier: polling.multiplier,
            max_delay: Duration::from_millis(polling.max_delay_ms),
            timeout: polling.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_max_delay_ms() -> u64 {
    20_000
}

impl Profile {
    pub fn new(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
            access_token: None,
            api_endpoint: None,
            quota_project: None,
            polling: None,
        }
    }

    /// Access token after env override and keyring lookup
    ///
    /// `None` when neither the profile nor the environment supplies one.
    pub fn resolve_access_token(&self) -> Result<Option<String>> {
        let store = CredentialStore::new();
        match &self.access_token {
            Some(value) => store
                .resolve(value, Some(ACCESS_TOKEN_ENV))
                .map(Some)
                .map_err(|e| {
                    ConfigError::CredentialError(format!("Failed to resolve access token: {e}"))
                }),
            None => Ok(std::env::var(ACCESS_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty())),
        }
    }

    /// Polling cadence, falling back to the library defaults
    pub fn poll_config(&self) -> PollConfig {
        self.polling
            .as_ref()
            .map(PollConfig::from)
            .unwrap_or_default()
    }
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields an empty config.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded = Self::expand_env_vars(&content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// All profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Pick the profile name to use
    ///
    /// Order: explicit name, `default_profile`, then the first profile
    /// alphabetically.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(name) = explicit_profile {
            return Ok(name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| (*name).clone())
            .ok_or_else(|| ConfigError::NoProfiles {
                suggestion: "Use 'vertexctl profile set' to create a profile.".to_string(),
            })
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Path of the configuration file
    ///
    /// On macOS `~/.config/vertexctl/config.toml` is preferred when that
    /// directory exists; otherwise the platform config directory is used
    /// (`~/.config/vertexctl` on Linux, `%APPDATA%\vertexctl` on Windows).
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("vertexctl")
                    .join("config.toml");
                if linux_style.parent().is_some_and(|p| p.exists()) {
                    return Ok(linux_style);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "vertexctl", "vertexctl").ok_or(ConfigError::ConfigDirError)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as written, so profiles
    /// that are never used do not need their variables set.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
