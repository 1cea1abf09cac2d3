//! The runnable seam between the adapter and the conversation engine

use super::error::Result;
use super::tools::RunnableTool;
use crate::content::Content;
use crate::context::PlatformContext;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Per-run options passed with every message
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Ask a human between turns; the adapter always sends `false`
    pub user_input: bool,
    pub tools: Vec<RunnableTool>,
    /// `None` runs until the model stops requesting tools
    pub max_turns: Option<u32>,
}

/// Result of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub chat_history: Vec<Content>,
    /// Text of the final model turn
    pub summary: String,
    pub turns: u32,
}

/// An executable conversation object
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runnable: Send + Sync {
    async fn run(&self, message: Value, options: RunOptions) -> Result<RunOutput>;
}

/// Everything a builder needs to instantiate a runnable
#[derive(Debug, Clone)]
pub struct RunnableConfig {
    pub model_name: String,
    pub runnable_name: String,
    pub system_instruction: Option<String>,
    pub llm_config: Value,
    pub runnable_kwargs: Map<String, Value>,
    pub context: PlatformContext,
}

/// Factory invoked by `set_up`
pub type RunnableBuilder =
    Arc<dyn Fn(&RunnableConfig) -> Result<Box<dyn Runnable>> + Send + Sync>;
