//! Explicit project/location context
//!
//! Everything that needs a project, a location or credentials takes a
//! [`PlatformContext`] instead of reading process-wide state.

use crate::client::{AiPlatformClient, DEFAULT_LOCATION};
use crate::config::config::{ACCESS_TOKEN_ENV, LOCATION_ENV, PROJECT_ENV};
use crate::config::{ConfigError, Profile};
use crate::error::{CoreError, Result};
use crate::lro::PollConfig;
use crate::names::location_path;
use std::env;

/// Project, location and credentials for a session
#[derive(Clone, PartialEq)]
pub struct PlatformContext {
    pub project: String,
    pub location: String,
    pub access_token: Option<String>,
    pub api_endpoint: Option<String>,
    pub quota_project: Option<String>,
    pub poll: PollConfig,
}

impl std::fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContext")
            .field("project", &self.project)
            .field("location", &self.location)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_endpoint", &self.api_endpoint)
            .field("quota_project", &self.quota_project)
            .field("poll", &self.poll)
            .finish()
    }
}

impl PlatformContext {
    pub fn new(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            location: location.into(),
            access_token: None,
            api_endpoint: None,
            quota_project: None,
            poll: PollConfig::default(),
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project = Some(project.into());
        self
    }

    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Build a context from `GOOGLE_CLOUD_PROJECT`, `GOOGLE_CLOUD_LOCATION`
    /// and `GOOGLE_OAUTH_ACCESS_TOKEN`
    pub fn from_env() -> Result<Self> {
        let project = non_empty_env(PROJECT_ENV)
            .ok_or_else(|| CoreError::Config(format!("{PROJECT_ENV} is not set")))?;
        let location = non_empty_env(LOCATION_ENV).unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let mut context = Self::new(project, location);
        context.access_token = non_empty_env(ACCESS_TOKEN_ENV);
        Ok(context)
    }

    /// Build a context from a stored profile
    ///
    /// With `env_overrides`, `GOOGLE_CLOUD_PROJECT` and `GOOGLE_CLOUD_LOCATION`
    /// replace the profile's values when set.
    pub fn from_profile(
        profile: &Profile,
        env_overrides: bool,
    ) -> std::result::Result<Self, ConfigError> {
        let mut project = profile.project.clone();
        let mut location = profile.location.clone();
        if env_overrides {
            if let Some(value) = non_empty_env(PROJECT_ENV) {
                project = value;
            }
            if let Some(value) = non_empty_env(LOCATION_ENV) {
                location = value;
            }
        }
        if project.trim().is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "project".to_string(),
                hint: format!("Set it in the profile or export {PROJECT_ENV}."),
            });
        }

        Ok(Self {
            project,
            location,
            access_token: profile.resolve_access_token()?,
            api_endpoint: profile.api_endpoint.clone(),
            quota_project: profile.quota_project.clone(),
            poll: profile.poll_config(),
        })
    }

    /// `projects/{project}/locations/{location}`
    pub fn parent(&self) -> String {
        location_path(&self.project, &self.location)
    }

    /// Client for this context's endpoint and credentials
    pub fn client(&self) -> Result<AiPlatformClient> {
        let mut builder = AiPlatformClient::builder().location(&self.location);
        if let Some(endpoint) = &self.api_endpoint {
            builder = builder.base_url(endpoint);
        }
        if let Some(token) = &self.access_token {
            builder = builder.access_token(token);
        }
        if let Some(project) = &self.quota_project {
            builder = builder.quota_project(project);
        }
        builder.build()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            env::remove_var(PROJECT_ENV);
            env::remove_var(LOCATION_ENV);
            env::remove_var(ACCESS_TOKEN_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        assert!(PlatformContext::from_env().is_err());

        unsafe {
            env::set_var(PROJECT_ENV, "env-project");
        }
        let context = PlatformContext::from_env().unwrap();
        assert_eq!(context.project, "env-project");
        assert_eq!(context.location, "us-central1");
        assert_eq!(context.parent(), "projects/env-project/locations/us-central1");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_profile_env_overrides() {
        clear_env();
        let profile = Profile::new("stored", "europe-west4");
        unsafe {
            env::set_var(PROJECT_ENV, "override");
        }

        let with = PlatformContext::from_profile(&profile, true).unwrap();
        assert_eq!(with.project, "override");
        assert_eq!(with.location, "europe-west4");

        let without = PlatformContext::from_profile(&profile, false).unwrap();
        assert_eq!(without.project, "stored");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_client_uses_endpoint_override() {
        clear_env();
        let context = PlatformContext::new("p", "asia-east1")
            .with_api_endpoint("http://127.0.0.1:9999")
            .with_access_token("secret");
        let client = context.client().unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
        assert_eq!(client.access_token(), Some("secret"));
        assert!(!format!("{context:?}").contains("secret"));

        let regional = PlatformContext::new("p", "asia-east1").client().unwrap();
        assert_eq!(
            regional.base_url(),
            "https://asia-east1-aiplatform.googleapis.com"
        );
    }
}
