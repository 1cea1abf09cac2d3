//! Agent adapter errors

use crate::error::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// A tool parameter was declared without a type
    #[error("tool `{function}` has untyped input_arg `{arg}`")]
    UntypedInputArg { function: String, arg: String },

    #[error("tool `{0}` is registered more than once")]
    DuplicateTool(String),

    #[error("failed to build runnable: {0}")]
    Builder(String),

    #[error("tool `{name}` failed: {message}")]
    ToolInvocation { name: String, message: String },

    #[error("model requested unknown tool `{0}`")]
    UnknownTool(String),

    #[error("runnable failed: {0}")]
    Runnable(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AgentError {
    /// True for errors raised while validating the agent's configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AgentError::UntypedInputArg { .. } | AgentError::DuplicateTool(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
