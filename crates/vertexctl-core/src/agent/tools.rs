//! Tool functions an agent may call
//!
//! A [`FunctionTool`] pairs a handler closure with a declared parameter list.
//! Every parameter must carry a type; the declaration is turned into the
//! model-facing function schema when the agent is set up.

use super::error::{AgentError, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    fn schema_type(&self) -> &'static str {
        match self {
            ParamType::String => "STRING",
            ParamType::Integer => "INTEGER",
            ParamType::Number => "NUMBER",
            ParamType::Boolean => "BOOLEAN",
            ParamType::Array => "ARRAY",
            ParamType::Object => "OBJECT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    /// `None` marks an untyped parameter, which is rejected at construction
    pub param_type: Option<ParamType>,
    pub required: bool,
    pub description: Option<String>,
}

type ToolFn = Arc<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

/// A callable tool with a typed signature
///
/// ```rust
/// use serde_json::json;
/// use vertexctl_core::agent::{FunctionTool, ParamType};
///
/// let tool = FunctionTool::new(
///     "place_tool_query",
///     "Searches the city for recommendations on the activity.",
///     |args| Ok(json!({"city": args["city"], "activity": args.get("activity")})),
/// )
/// .param("city", ParamType::String, true)
/// .param("activity", ParamType::String, false);
///
/// assert!(tool.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    params: Vec<ToolParam>,
    handler: ToolFn,
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl FunctionTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        self.params.push(ToolParam {
            name: name.into(),
            param_type: Some(param_type),
            required,
            description: None,
        });
        self
    }

    /// Declare a parameter with no type
    #[must_use]
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ToolParam {
            name: name.into(),
            param_type: None,
            required: true,
            description: None,
        });
        self
    }

    /// Attach a description to the most recently declared parameter
    #[must_use]
    pub fn describe_last(mut self, description: impl Into<String>) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.description = Some(description.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ToolParam] {
        &self.params
    }

    /// Fail on the first untyped parameter
    pub fn validate(&self) -> Result<()> {
        match self.params.iter().find(|p| p.param_type.is_none()) {
            Some(param) => Err(AgentError::UntypedInputArg {
                function: self.name.clone(),
                arg: param.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Model-facing schema for this tool
    pub fn declaration(&self) -> FunctionDeclaration {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut schema = Map::new();
            if let Some(ty) = param.param_type {
                schema.insert("type".to_string(), json!(ty.schema_type()));
            }
            if let Some(description) = &param.description {
                schema.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(schema));
            if param.required {
                required.push(param.name.clone());
            }
        }
        FunctionDeclaration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "OBJECT",
                "properties": properties,
                "required": required,
            }),
        }
    }

    /// Invoke the handler with model-supplied arguments
    pub fn call(&self, args: &Value) -> Result<Value> {
        (self.handler)(args).map_err(|message| AgentError::ToolInvocation {
            name: self.name.clone(),
            message,
        })
    }
}

/// Function schema sent to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool converted into the form a runnable consumes
#[derive(Debug, Clone)]
pub struct RunnableTool {
    pub declaration: FunctionDeclaration,
    pub function: FunctionTool,
}

/// Validate every tool: typed parameters and unique names
pub fn validate_tools(tools: &[FunctionTool]) -> Result<()> {
    let mut seen = HashSet::new();
    for tool in tools {
        tool.validate()?;
        if !seen.insert(tool.name.as_str()) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }
    }
    Ok(())
}

pub(crate) fn to_runnable_tools(tools: &[FunctionTool]) -> Vec<RunnableTool> {
    tools
        .iter()
        .map(|tool| RunnableTool {
            declaration: tool.declaration(),
            function: tool.clone(),
        })
        .collect()
}
