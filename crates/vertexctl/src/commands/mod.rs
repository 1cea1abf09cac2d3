//! Command handlers

pub mod async_utils;
pub mod cluster;
pub mod example;
pub mod extension;
pub mod index;
pub mod job;
pub mod operation;
pub mod profile;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli;
use crate::error::{Result as CliResult, VertexCtlError};
use crate::output::{self, OutputFormat};

/// Global output options every handler receives
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions<'a> {
    pub format: cli::OutputFormat,
    pub query: Option<&'a str>,
}

impl OutputOptions<'_> {
    /// Print `data`; `auto` renders as `auto_default`
    pub fn print<T: Serialize>(&self, data: T, auto_default: OutputFormat) -> CliResult<()> {
        let format = OutputFormat::resolve(self.format, auto_default);
        output::print_output(data, format, self.query)?;
        Ok(())
    }

    /// True when the user asked for machine-readable output
    pub fn is_structured(&self) -> bool {
        matches!(self.format, cli::OutputFormat::Json | cli::OutputFormat::Yaml)
    }
}

/// Read a JSON or YAML file, chosen by extension
pub fn read_input_file<T: DeserializeOwned>(path: &str) -> CliResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| VertexCtlError::FileError {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| VertexCtlError::InvalidInput {
        message: format!("{}: {}", path, message),
    })
}
