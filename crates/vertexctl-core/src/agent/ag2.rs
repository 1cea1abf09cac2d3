//! AG2 agent adapter
//!
//! [`Ag2Agent`] is a configuration object. Building it validates the tools
//! but instantiates nothing; [`Ag2Agent::set_up`] creates the runnable and
//! the runnable-side tool objects, and [`Ag2Agent::query`] calls `set_up`
//! on first use.

use super::conversable::ConversableAgent;
use super::error::{AgentError, Result};
use super::runnable::{RunOptions, RunOutput, Runnable, RunnableBuilder, RunnableConfig};
use super::tools::{FunctionTool, RunnableTool, to_runnable_tools, validate_tools};
use crate::context::PlatformContext;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span};

/// Adapter around a conversational runnable
///
/// # Example
///
/// ```rust,ignore
/// use vertexctl_core::agent::{Ag2Agent, FunctionTool, ParamType};
///
/// let mut agent = Ag2Agent::builder("gemini-1.5-pro", "trip-planner", context)
///     .system_instruction("You are a helpful bot.")
///     .tool(
///         FunctionTool::new("place_tool_query", "Searches the city.", search)
///             .param("city", ParamType::String, true),
///     )
///     .build()?;
///
/// let output = agent.query("What should I see in Oslo?", Some(4)).await?;
/// println!("{}", output.summary);
/// ```
pub struct Ag2Agent {
    model_name: String,
    runnable_name: String,
    system_instruction: Option<String>,
    tools: Vec<FunctionTool>,
    llm_config: Option<Value>,
    runnable_kwargs: Map<String, Value>,
    runnable_builder: Option<RunnableBuilder>,
    enable_tracing: bool,
    context: PlatformContext,
    runnable: Option<Box<dyn Runnable>>,
    tool_objects: Vec<RunnableTool>,
}

impl fmt::Debug for Ag2Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ag2Agent")
            .field("model_name", &self.model_name)
            .field("runnable_name", &self.runnable_name)
            .field("tools", &self.tools.len())
            .field("enable_tracing", &self.enable_tracing)
            .field("context", &self.context)
            .field("set_up", &self.runnable.is_some())
            .finish_non_exhaustive()
    }
}

/// Same configuration, fresh state: the clone has no runnable and no tool
/// objects until its own `set_up`.
impl Clone for Ag2Agent {
    fn clone(&self) -> Self {
        Self {
            model_name: self.model_name.clone(),
            runnable_name: self.runnable_name.clone(),
            system_instruction: self.system_instruction.clone(),
            tools: self.tools.clone(),
            llm_config: self.llm_config.clone(),
            runnable_kwargs: self.runnable_kwargs.clone(),
            runnable_builder: self.runnable_builder.clone(),
            enable_tracing: self.enable_tracing,
            context: self.context.clone(),
            runnable: None,
            tool_objects: Vec::new(),
        }
    }
}

/// Builder for [`Ag2Agent`]
pub struct Ag2AgentBuilder {
    agent: Ag2Agent,
}

impl Ag2AgentBuilder {
    #[must_use]
    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.agent.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn tool(mut self, tool: FunctionTool) -> Self {
        self.agent.tools.push(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: impl IntoIterator<Item = FunctionTool>) -> Self {
        self.agent.tools.extend(tools);
        self
    }

    /// Replace the generated LLM config
    #[must_use]
    pub fn llm_config(mut self, config: Value) -> Self {
        self.agent.llm_config = Some(config);
        self
    }

    /// Extra keyword arguments handed to the runnable builder
    #[must_use]
    pub fn runnable_kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.agent.runnable_kwargs.insert(key.into(), value);
        self
    }

    /// Use a custom factory instead of the default conversable agent
    #[must_use]
    pub fn runnable_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&RunnableConfig) -> Result<Box<dyn Runnable>> + Send + Sync + 'static,
    {
        self.agent.runnable_builder = Some(Arc::new(builder));
        self
    }

    #[must_use]
    pub fn enable_tracing(mut self, enabled: bool) -> Self {
        self.agent.enable_tracing = enabled;
        self
    }

    /// Validate the tools and return the (not yet set up) agent
    pub fn build(self) -> Result<Ag2Agent> {
        validate_tools(&self.agent.tools)?;
        Ok(self.agent)
    }
}

impl Ag2Agent {
    pub fn builder(
        model_name: impl Into<String>,
        runnable_name: impl Into<String>,
        context: PlatformContext,
    ) -> Ag2AgentBuilder {
        Ag2AgentBuilder {
            agent: Ag2Agent {
                model_name: model_name.into(),
                runnable_name: runnable_name.into(),
                system_instruction: None,
                tools: Vec::new(),
                llm_config: None,
                runnable_kwargs: Map::new(),
                runnable_builder: None,
                enable_tracing: false,
                context,
                runnable: None,
                tool_objects: Vec::new(),
            },
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn runnable_name(&self) -> &str {
        &self.runnable_name
    }

    pub fn context(&self) -> &PlatformContext {
        &self.context
    }

    pub fn tools(&self) -> &[FunctionTool] {
        &self.tools
    }

    /// Tool objects built by the last `set_up`
    pub fn tool_objects(&self) -> &[RunnableTool] {
        &self.tool_objects
    }

    pub fn runnable(&self) -> Option<&dyn Runnable> {
        self.runnable.as_deref()
    }

    pub fn is_set_up(&self) -> bool {
        self.runnable.is_some()
    }

    /// LLM config handed to the runnable
    ///
    /// Defaults to a single Google config entry for the agent's project,
    /// location and model.
    pub fn llm_config(&self) -> Value {
        self.llm_config.clone().unwrap_or_else(|| {
            json!({
                "config_list": [{
                    "project_id": self.context.project,
                    "location": self.context.location,
                    "model": self.model_name,
                    "api_type": "google",
                }]
            })
        })
    }

    fn runnable_config(&self) -> RunnableConfig {
        RunnableConfig {
            model_name: self.model_name.clone(),
            runnable_name: self.runnable_name.clone(),
            system_instruction: self.system_instruction.clone(),
            llm_config: self.llm_config(),
            runnable_kwargs: self.runnable_kwargs.clone(),
            context: self.context.clone(),
        }
    }

    /// Instantiate the runnable and tool objects
    ///
    /// Calling it again rebuilds both.
    pub fn set_up(&mut self) -> Result<()> {
        let config = self.runnable_config();
        let runnable = match &self.runnable_builder {
            Some(builder) => builder(&config)?,
            None => Box::new(ConversableAgent::from_config(&config)?),
        };
        self.tool_objects = to_runnable_tools(&self.tools);
        self.runnable = Some(runnable);
        debug!(
            "Set up runnable '{}' with {} tools",
            self.runnable_name,
            self.tool_objects.len()
        );
        Ok(())
    }

    /// Run one query
    ///
    /// String input is wrapped as `{"content": input}`; objects are passed
    /// through. The runnable never waits for human input.
    pub async fn query(
        &mut self,
        input: impl Into<Value>,
        max_turns: Option<u32>,
    ) -> Result<RunOutput> {
        if self.runnable.is_none() {
            self.set_up()?;
        }

        let message = match input.into() {
            Value::String(text) => json!({ "content": text }),
            other => other,
        };
        let options = RunOptions {
            user_input: false,
            tools: self.tool_objects.clone(),
            max_turns,
        };

        let runnable = self
            .runnable
            .as_deref()
            .ok_or_else(|| AgentError::Runnable("runnable is not set up".to_string()))?;
        if self.enable_tracing {
            let span = info_span!(
                "ag2_agent.query",
                runnable = %self.runnable_name,
                model = %self.model_name,
            );
            runnable.run(message, options).instrument(span).await
        } else {
            runnable.run(message, options).await
        }
    }
}
