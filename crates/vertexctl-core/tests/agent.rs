//! Ag2Agent with the default runnable against a mocked generateContent endpoint

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vertexctl_core::PlatformContext;
use vertexctl_core::agent::{Ag2Agent, AgentError, FunctionTool, ParamType};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE: &str = "/v1/projects/test-project/locations/us-central1/publishers/google/models/gemini-1.0-pro:generateContent";

fn context(server: &MockServer) -> PlatformContext {
    PlatformContext::new("test-project", "us-central1")
        .with_api_endpoint(server.uri())
        .with_access_token("test-token")
}

fn weather_tool(calls: Arc<AtomicUsize>) -> FunctionTool {
    FunctionTool::new("get_weather", "Current weather for a city.", move |args| {
        calls.fetch_add(1, Ordering::SeqCst);
        match args.get("city").and_then(|c| c.as_str()) {
            Some(city) => Ok(json!(format!("sunny in {city}"))),
            None => Err("city is required".to_string()),
        }
    })
    .param("city", ParamType::String, true)
}

fn model_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_query_runs_requested_tool_and_returns_summary() {
    let server = MockServer::start().await;

    // Second turn: the tool result has been fed back
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .and(body_string_contains("functionResponse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_text("It is sunny in Paris.")))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    // First turn: the model asks for the tool
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Answer briefly."}]},
            "tools": [{"functionDeclarations": [{"name": "get_weather"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "get_weather", "args": {"city": "Paris"}}}]
                },
                "finishReason": "STOP"
            }]
        })))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let mut agent = Ag2Agent::builder("gemini-1.0-pro", "weather-agent", context(&server))
        .system_instruction("Answer briefly.")
        .tool(weather_tool(calls.clone()))
        .build()
        .unwrap();
    assert!(!agent.is_set_up());

    let output = agent.query("What is the weather in Paris?", None).await.unwrap();

    assert!(agent.is_set_up());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(output.turns, 2);
    assert_eq!(output.summary, "It is sunny in Paris.");
    // user, model call, tool response, model answer
    assert_eq!(output.chat_history.len(), 4);
}

#[tokio::test]
async fn test_max_turns_stops_before_running_tools() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "get_weather", "args": {"city": "Oslo"}}}]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let mut agent = Ag2Agent::builder("gemini-1.0-pro", "weather-agent", context(&server))
        .tool(weather_tool(calls.clone()))
        .build()
        .unwrap();

    let output = agent.query("Weather in Oslo?", Some(1)).await.unwrap();
    assert_eq!(output.turns, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_untyped_tool_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let untyped = FunctionTool::new("echo", "Echo the input.", |args| Ok(args.clone()))
        .untyped_param("input_");
    let result = Ag2Agent::builder("gemini-1.0-pro", "echo-agent", context(&server))
        .tool(untyped)
        .build();

    assert!(matches!(result, Err(AgentError::UntypedInputArg { .. })));
}
