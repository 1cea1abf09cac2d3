//! Profile management command implementations

use crate::cli::ProfileCommands;
use crate::commands::OutputOptions;
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, VertexCtlError};
use crate::output::OutputFormat;
use colored::Colorize;
use serde_json::json;
use tracing::{debug, info};
use vertexctl_core::config::{Config, CredentialStore, Profile};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, out),
        Path => handle_path(conn_mgr, out),
        Show { name } => handle_show(conn_mgr, name, out),
        Set {
            name,
            project,
            location,
            access_token,
            prompt_token,
            api_endpoint,
            quota_project,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let token = match (access_token, prompt_token) {
                (Some(token), _) => Some(token.clone()),
                (None, true) => Some(rpassword::prompt_password("Access token: ")?),
                (None, false) => None,
            };
            let mut profile = Profile::new(project.clone(), location.clone());
            profile.api_endpoint = api_endpoint.clone();
            profile.quota_project = quota_project.clone();
            profile.access_token = token;

            #[cfg(feature = "secure-storage")]
            let profile = if *use_keyring {
                move_token_to_keyring(name, profile)?
            } else {
                profile
            };

            handle_set(conn_mgr, name, profile)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Replace a plaintext token with a `keyring:` reference
#[cfg(feature = "secure-storage")]
fn move_token_to_keyring(name: &str, mut profile: Profile) -> CliResult<Profile> {
    if let Some(token) = profile.access_token.take() {
        let reference = CredentialStore::new().store(&format!("{}-access-token", name), &token)?;
        profile.access_token = Some(reference);
    }
    Ok(profile)
}

fn config_path_display(conn_mgr: &ConnectionManager) -> Option<String> {
    conn_mgr
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .or_else(|| Config::config_path().ok().map(|p| p.display().to_string()))
}

fn handle_list(conn_mgr: &ConnectionManager, out: OutputOptions<'_>) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();

    if out.is_structured() {
        let profile_list: Vec<_> = profiles
            .iter()
            .map(|(name, profile)| {
                json!({
                    "name": name,
                    "project": profile.project,
                    "location": profile.location,
                    "is_default": conn_mgr.config.default_profile.as_deref() == Some(name.as_str()),
                })
            })
            .collect();
        return out.print(
            json!({
                "config_path": config_path_display(conn_mgr),
                "profiles": profile_list,
                "count": profiles.len(),
            }),
            OutputFormat::Json,
        );
    }

    if let Some(path) = config_path_display(conn_mgr) {
        println!("Configuration file: {}", path);
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'vertexctl profile set' to create a profile.");
        return Ok(());
    }

    let rows: Vec<_> = profiles
        .iter()
        .map(|(name, profile)| {
            let marker = if conn_mgr.config.default_profile.as_deref() == Some(name.as_str()) {
                "*"
            } else {
                ""
            };
            json!({
                "name": format!("{}{}", name, marker),
                "project": profile.project,
                "location": profile.location,
                "endpoint": profile.api_endpoint.as_deref().unwrap_or("regional"),
            })
        })
        .collect();
    out.print(rows, OutputFormat::Table)
}

fn handle_path(conn_mgr: &ConnectionManager, out: OutputOptions<'_>) -> CliResult<()> {
    let path = match &conn_mgr.config_path {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    if out.is_structured() {
        out.print(json!({ "config_path": path }), OutputFormat::Json)
    } else {
        println!("{}", path.display());
        Ok(())
    }
}

/// Token shown as its storage kind, never its value
fn describe_token(token: Option<&str>) -> &'static str {
    match token {
        None => "not set (falls back to GOOGLE_OAUTH_ACCESS_TOKEN)",
        Some(t) if CredentialStore::is_keyring_reference(t) => "stored in keyring",
        Some(t) if t.starts_with("${") => "environment reference",
        Some(_) => "stored in config file",
    }
}

fn handle_show(conn_mgr: &ConnectionManager, name: &str, out: OutputOptions<'_>) -> CliResult<()> {
    let profile = conn_mgr.config.profile(name)?;
    let mut data = json!({
        "name": name,
        "project": profile.project,
        "location": profile.location,
        "access_token": describe_token(profile.access_token.as_deref()),
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
    });
    if let Some(endpoint) = &profile.api_endpoint {
        data["api_endpoint"] = json!(endpoint);
    }
    if let Some(quota) = &profile.quota_project {
        data["quota_project"] = json!(quota);
    }
    if let Some(polling) = &profile.polling {
        data["polling"] = serde_json::to_value(polling)?;
    }
    out.print(data, OutputFormat::Table)
}

fn handle_set(conn_mgr: &ConnectionManager, name: &str, profile: Profile) -> CliResult<()> {
    if profile.project.trim().is_empty() {
        return Err(VertexCtlError::InvalidInput {
            message: "--project must not be empty".to_string(),
        });
    }

    let mut config = conn_mgr.config.clone();
    let existed = config.profiles.contains_key(name);
    let first = config.profiles.is_empty();
    config.set_profile(name.to_string(), profile);
    if first {
        config.default_profile = Some(name.to_string());
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;
    info!("Saved profile {}", name);
    println!(
        "{} profile '{}'",
        if existed { "Updated" } else { "Created" }.green(),
        name
    );
    if first {
        println!("Set '{}' as the default profile", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let mut config = conn_mgr.config.clone();
    let removed = config
        .remove_profile(name)
        .ok_or_else(|| VertexCtlError::ProfileNotFound {
            name: name.to_string(),
        })?;

    if let Some(token) = removed.access_token.as_deref()
        && CredentialStore::is_keyring_reference(token)
        && let Err(e) = CredentialStore::new().delete(token)
    {
        println!("{} could not remove keyring entry: {}", "warning".yellow(), e);
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;
    println!("Removed profile '{}'", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let mut config = conn_mgr.config.clone();
    config.profile(name)?;
    config.default_profile = Some(name.to_string());
    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;
    println!("Default profile set to '{}'", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_token_never_reveals_value() {
        assert_eq!(describe_token(Some("ya29.secret")), "stored in config file");
        assert_eq!(
            describe_token(Some("${GOOGLE_OAUTH_ACCESS_TOKEN}")),
            "environment reference"
        );
        assert!(describe_token(None).starts_with("not set"));
    }
}
