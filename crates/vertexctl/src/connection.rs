//! Resolving profiles into platform contexts

use crate::error::{Result as CliResult, VertexCtlError};
use anyhow::Context;
use vertexctl_core::config::Config;
use vertexctl_core::config::config::PROJECT_ENV;
use vertexctl_core::{AiPlatformClient, PlatformContext};
use tracing::{debug, info, trace};

/// User agent string for vertexctl HTTP requests
const VERTEXCTL_USER_AGENT: &str = concat!("vertexctl/", env!("CARGO_PKG_VERSION"));

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with the given configuration
    #[cfg(test)]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Resolve the project, location and credentials for a command
    ///
    /// When --config-file is explicitly specified, environment variables are
    /// ignored so the file is the only source of project and location.
    /// Without any profile, the context comes from the environment alone.
    pub fn resolve_context(&self, profile_name: Option<&str>) -> CliResult<PlatformContext> {
        trace!("Profile name: {:?}", profile_name);
        let use_env_vars = self.config_path.is_none();
        debug!(
            "Config path: {:?}, use_env_vars: {}",
            self.config_path, use_env_vars
        );

        if self.config.profiles.is_empty() && profile_name.is_none() {
            if use_env_vars && std::env::var(PROJECT_ENV).is_ok_and(|v| !v.is_empty()) {
                info!("No profiles configured, using {} from the environment", PROJECT_ENV);
                return Ok(PlatformContext::from_env()?);
            }
            return Err(VertexCtlError::NoProfileConfigured);
        }

        let resolved = self.config.resolve_profile(profile_name)?;
        info!("Using profile: {}", resolved);
        let profile = self.config.profile(&resolved)?;
        let context = PlatformContext::from_profile(profile, use_env_vars)?;
        debug!(
            "Resolved context for {} in {}",
            context.project, context.location
        );
        Ok(context)
    }

    /// Context plus a client carrying the CLI user agent
    pub fn create_client(
        &self,
        profile_name: Option<&str>,
    ) -> CliResult<(PlatformContext, AiPlatformClient)> {
        let context = self.resolve_context(profile_name)?;
        let mut builder = AiPlatformClient::builder()
            .location(&context.location)
            .user_agent(VERTEXCTL_USER_AGENT);
        if let Some(endpoint) = &context.api_endpoint {
            builder = builder.base_url(endpoint);
        }
        if let Some(token) = &context.access_token {
            builder = builder.access_token(token);
        }
        if let Some(project) = &context.quota_project {
            builder = builder.quota_project(project);
        }
        let client = builder.build()?;
        Ok((context, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use vertexctl_core::config::Profile;
    use vertexctl_core::config::config::LOCATION_ENV;

    fn config_with(profile: Profile) -> Config {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), profile);
        config
    }

    #[test]
    #[serial]
    fn test_explicit_config_file_ignores_env_overrides() {
        unsafe {
            std::env::set_var(PROJECT_ENV, "env-project");
            std::env::set_var(LOCATION_ENV, "asia-east1");
        }
        let manager = ConnectionManager::with_config_path(
            config_with(Profile::new("file-project", "europe-west4")),
            Some("/tmp/vertexctl-test.toml".into()),
        );
        let context = manager.resolve_context(None).unwrap();
        assert_eq!(context.project, "file-project");
        assert_eq!(context.location, "europe-west4");

        let manager = ConnectionManager::new(manager.config.clone());
        let context = manager.resolve_context(None).unwrap();
        assert_eq!(context.project, "env-project");
        assert_eq!(context.location, "asia-east1");
        unsafe {
            std::env::remove_var(PROJECT_ENV);
            std::env::remove_var(LOCATION_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_no_profiles_falls_back_to_environment() {
        unsafe {
            std::env::remove_var(PROJECT_ENV);
        }
        let manager = ConnectionManager::new(Config::default());
        assert!(matches!(
            manager.resolve_context(None),
            Err(VertexCtlError::NoProfileConfigured)
        ));

        unsafe {
            std::env::set_var(PROJECT_ENV, "env-only");
        }
        let context = manager.resolve_context(None).unwrap();
        assert_eq!(context.project, "env-only");
        unsafe {
            std::env::remove_var(PROJECT_ENV);
        }
    }

    #[test]
    fn test_unknown_profile_is_reported() {
        let manager = ConnectionManager::with_config_path(
            config_with(Profile::new("p", "us-central1")),
            Some("/tmp/vertexctl-test.toml".into()),
        );
        assert!(matches!(
            manager.resolve_context(Some("missing")),
            Err(VertexCtlError::ProfileNotFound { .. })
        ));
    }
}
