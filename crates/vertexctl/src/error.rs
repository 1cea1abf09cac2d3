//! Error types for vertexctl
//!
//! Library errors are folded into [`VertexCtlError`], which knows how to
//! print itself as a cargo-style diagnostic with suggestions.

use colored::Colorize;
use thiserror::Error;
use vertexctl_core::CoreError;
use vertexctl_core::config::ConfigError;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: list available profiles
///       vertexctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the vertexctl application
#[derive(Error, Debug)]
pub enum VertexCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'vertexctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Missing {setting}: {hint}")]
    MissingSetting { setting: String, hint: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Operation {name} failed (code {code}): {message}")]
    OperationFailed {
        name: String,
        code: i32,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },

    #[error("Aborted")]
    Aborted,
}

/// Result type for vertexctl operations
pub type Result<T> = std::result::Result<T, VertexCtlError>;

impl VertexCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            VertexCtlError::ProfileNotFound { name } => vec![
                "List available profiles: vertexctl profile list".to_string(),
                format!(
                    "Create profile '{}': vertexctl profile set {} --project <project>",
                    name, name
                ),
            ],
            VertexCtlError::NoProfileConfigured => vec![
                "Create a profile: vertexctl profile set dev --project <project> --location us-central1".to_string(),
                "Or export GOOGLE_CLOUD_PROJECT and GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
            ],
            VertexCtlError::MissingSetting { .. } => vec![
                "Check profile details: vertexctl profile show <profile>".to_string(),
            ],
            VertexCtlError::AuthenticationFailed { .. } => vec![
                "Refresh the token: export GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token)".to_string(),
                "Check the profile token: vertexctl profile show <profile>".to_string(),
                "Verify the account has Vertex AI permissions on the project".to_string(),
            ],
            VertexCtlError::NotFound { .. } => vec![
                "Verify the resource id or full resource name".to_string(),
                "Check that the profile points at the right project and location".to_string(),
            ],
            VertexCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify api_endpoint in the profile: vertexctl profile show <profile>".to_string(),
            ],
            VertexCtlError::Timeout { .. } => vec![
                "The operation keeps running on the server; check it with: vertexctl operation get <name>".to_string(),
                "Wait longer: vertexctl operation wait <name> --timeout <seconds>".to_string(),
            ],
            VertexCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: vertexctl <command> --help".to_string(),
                "Verify input file format is correct (JSON/YAML)".to_string(),
            ],
            VertexCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let VertexCtlError::MissingSetting { hint, .. } = self {
            diag = diag.detail(hint);
        }
        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CoreError> for VertexCtlError {
    fn from(err: CoreError) -> Self {
        if err.is_unauthorized() {
            return VertexCtlError::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        match err {
            CoreError::Validation(message) => VertexCtlError::InvalidInput { message },
            CoreError::Api { status: 404, .. } => VertexCtlError::NotFound {
                message: err.to_string(),
            },
            CoreError::Api { .. } => VertexCtlError::ApiError {
                message: err.to_string(),
            },
            CoreError::Transport(e) if e.is_timeout() => VertexCtlError::Timeout {
                message: e.to_string(),
            },
            CoreError::Transport(e) => VertexCtlError::ConnectionError {
                message: e.to_string(),
            },
            CoreError::OperationFailed {
                name,
                code,
                message,
                ..
            } => VertexCtlError::OperationFailed {
                name,
                code,
                message,
            },
            CoreError::OperationTimeout(duration) => VertexCtlError::Timeout {
                message: format!(
                    "Operation did not finish within {} seconds",
                    duration.as_secs()
                ),
            },
            CoreError::Decode(e) => VertexCtlError::ApiError {
                message: format!("Invalid response payload: {}", e),
            },
            CoreError::Config(message) => VertexCtlError::Configuration(message),
        }
    }
}

impl From<ConfigError> for VertexCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => VertexCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => VertexCtlError::NoProfileConfigured,
            ConfigError::MissingSetting { setting, hint } => {
                VertexCtlError::MissingSetting { setting, hint }
            }
            other => VertexCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VertexCtlError {
    fn from(err: serde_json::Error) -> Self {
        VertexCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for VertexCtlError {
    fn from(err: std::io::Error) -> Self {
        VertexCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for VertexCtlError {
    fn from(err: anyhow::Error) -> Self {
        VertexCtlError::OutputError {
            message: format!("{:#}", err),
        }
    }
}

impl From<dialoguer::Error> for VertexCtlError {
    fn from(err: dialoguer::Error) -> Self {
        VertexCtlError::InvalidInput {
            message: format!("Prompt failed: {}", err),
        }
    }
}
