//! Default runnable backed by the `generateContent` endpoint
//!
//! The agent sends the conversation so far, runs any function calls the
//! model asks for, feeds the results back, and repeats until the model
//! answers without calling a tool or the turn limit is hit.

use super::error::{AgentError, Result};
use super::runnable::{RunOptions, RunOutput, Runnable, RunnableConfig};
use super::tools::{FunctionDeclaration, RunnableTool};
use crate::client::{AiPlatformClient, ApiVersion};
use crate::content::{Content, Part};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Conversable agent that talks to a publisher model
pub struct ConversableAgent {
    client: AiPlatformClient,
    name: String,
    model_path: String,
    system_instruction: Option<String>,
    generation_config: Option<Value>,
}

impl std::fmt::Debug for ConversableAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversableAgent")
            .field("name", &self.name)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl ConversableAgent {
    /// Build from the adapter's config; `runnable_kwargs.generation_config`
    /// is forwarded to the model when present
    pub fn from_config(config: &RunnableConfig) -> Result<Self> {
        let client = config.context.client()?;
        let model_path = if config.model_name.starts_with("projects/") {
            config.model_name.clone()
        } else {
            format!(
                "{}/publishers/google/models/{}",
                config.context.parent(),
                config.model_name
            )
        };
        Ok(Self {
            client,
            name: config.runnable_name.clone(),
            model_path,
            system_instruction: config.system_instruction.clone(),
            generation_config: config.runnable_kwargs.get("generation_config").cloned(),
        })
    }

    async fn generate(
        &self,
        history: &[Content],
        tools: &[ToolDeclarations],
    ) -> Result<Content> {
        let request = GenerateContentRequest {
            contents: history,
            system_instruction: self
                .system_instruction
                .as_ref()
                .map(|text| Content {
                    role: None,
                    parts: vec![Part::text(text.clone())],
                }),
            tools: tools.to_vec(),
            generation_config: self.generation_config.clone(),
        };
        let response: GenerateContentResponse = self
            .client
            .post(
                ApiVersion::V1,
                &format!("{}:generateContent", self.model_path),
                &[],
                &request,
            )
            .await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Runnable("model returned no candidates".to_string()))?;
        debug!(
            "{} turn finished: {}",
            self.name,
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
        let mut content = candidate.content.unwrap_or_default();
        if content.role.is_none() {
            content.role = Some("model".to_string());
        }
        Ok(content)
    }
}

/// Text of an incoming message: `{"content": "..."}` or any other JSON
fn message_text(message: &Value) -> String {
    match message.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => match message {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}

/// Function responses must be JSON objects
fn as_response_object(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            Value::Object(map)
        }
    }
}

fn run_tool(tools: &[RunnableTool], name: &str, args: &Value) -> Result<Value> {
    let tool = tools
        .iter()
        .find(|tool| tool.declaration.name == name)
        .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;
    Ok(match tool.function.call(args) {
        Ok(value) => as_response_object(value),
        Err(e) => {
            warn!("{}", e);
            json!({ "error": e.to_string() })
        }
    })
}

#[async_trait]
impl Runnable for ConversableAgent {
    async fn run(&self, message: Value, options: RunOptions) -> Result<RunOutput> {
        if options.user_input {
            return Err(AgentError::Runnable(
                "interactive human input is not supported".to_string(),
            ));
        }

        let declarations = if options.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolDeclarations {
                function_declarations: options
                    .tools
                    .iter()
                    .map(|tool| tool.declaration.clone())
                    .collect(),
            }]
        };

        let mut history = vec![Content::user_text(message_text(&message))];
        let mut turns = 0;
        loop {
            turns += 1;
            let reply = self.generate(&history, &declarations).await?;
            let calls: Vec<_> = reply.function_calls().cloned().collect();
            history.push(reply);

            if calls.is_empty() || options.max_turns.is_some_and(|max| turns >= max) {
                break;
            }

            let mut parts = Vec::with_capacity(calls.len());
            for call in calls {
                let response = run_tool(&options.tools, &call.name, &call.args)?;
                parts.push(Part::function_response(call.name, response));
            }
            history.push(Content::new("user", parts));
        }

        let summary = history
            .iter()
            .rev()
            .find(|content| content.role.as_deref() == Some("model"))
            .map(Content::text)
            .unwrap_or_default();
        Ok(RunOutput {
            chat_history: history,
            summary,
            turns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tools::{FunctionTool, ParamType, to_runnable_tools};

    #[test]
    fn test_message_text() {
        assert_eq!(message_text(&json!({"content": "hi"})), "hi");
        assert_eq!(message_text(&json!("plain")), "plain");
        assert_eq!(message_text(&json!({"content": {"a": 1}})), r#"{"a":1}"#);
    }

    #[test]
    fn test_run_tool_wraps_scalars_and_errors() {
        let tools = to_runnable_tools(&[
            FunctionTool::new("count", "counts", |_| Ok(json!(3)))
                .param("what", ParamType::String, true),
            FunctionTool::new("fail", "fails", |_| Err("quota".to_string())),
        ]);
        assert_eq!(
            run_tool(&tools, "count", &json!({})).unwrap(),
            json!({"result": 3})
        );
        let error = run_tool(&tools, "fail", &json!({})).unwrap();
        assert!(error["error"].as_str().unwrap().contains("quota"));
        assert!(matches!(
            run_tool(&tools, "missing", &json!({})),
            Err(AgentError::UnknownTool(_))
        ));
    }
}
