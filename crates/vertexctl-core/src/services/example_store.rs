//! Example stores (v1beta1)
//!
//! An example store holds few-shot examples an agent can retrieve at query
//! time. Each example pairs input contents with the expected model output.

use crate::client::{AiPlatformClient, ApiVersion};
use crate::content::Content;
use crate::error::{CoreError, Result};
use crate::lro::Status;
use crate::names::require;
use crate::pagination::{PagedResponse, Pager};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored few-shot example
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_contents_example: Option<StoredContentsExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Server-assigned unless provided on upsert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Example {
    /// Example whose single user turn maps to a single expected model turn
    pub fn from_text(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            stored_contents_example: Some(StoredContentsExample {
                contents_example: Some(ContentsExample {
                    contents: vec![Content::user_text(input)],
                    expected_contents: vec![ExpectedContent {
                        content: Some(Content::model_text(expected)),
                    }],
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContentsExample {
    /// Key used for similarity search; derived from the contents when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents_example: Option<ContentsExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_key_generation_method: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsExample {
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(default)]
    pub expected_contents: Vec<ExpectedContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertExamplesRequest {
    #[serde(skip)]
    pub example_store: String,
    pub examples: Vec<Example>,
    #[serde(default)]
    pub overwrite: bool,
}

impl UpsertExamplesRequest {
    pub fn new(example_store: impl Into<String>, examples: Vec<Example>) -> Self {
        Self {
            example_store: example_store.into(),
            examples,
            overwrite: false,
        }
    }

    /// Replace examples whose ids already exist instead of failing them
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Per-example outcome of an upsert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertExamplesResponse {
    #[serde(default)]
    pub results: Vec<UpsertResult>,
}

/// Selects examples by id or by a stored-contents filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchExamplesRequest {
    #[serde(skip)]
    pub example_store: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_contents_example_filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
}

impl FetchExamplesRequest {
    pub fn new(example_store: impl Into<String>) -> Self {
        Self {
            example_store: example_store.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_example_ids(mut self, ids: Vec<String>) -> Self {
        self.example_ids = ids;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchExamplesResponse {
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl PagedResponse for FetchExamplesResponse {
    type Item = Example;

    fn into_page(self) -> (Vec<Example>, Option<String>) {
        (self.examples, self.next_page_token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveExamplesRequest {
    #[serde(skip)]
    pub example_store: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_contents_example_filter: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveExamplesResponse {
    #[serde(default)]
    pub example_ids: Vec<String>,
}

/// Example store operations
#[derive(Debug, Clone)]
pub struct ExampleStoreHandler {
    client: AiPlatformClient,
}

impl ExampleStoreHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    /// Create or update examples in a store
    pub async fn upsert_examples(
        &self,
        request: &UpsertExamplesRequest,
    ) -> Result<UpsertExamplesResponse> {
        let store = require("example_store", &request.example_store)?;
        if request.examples.is_empty() {
            return Err(CoreError::missing("examples"));
        }
        self.client
            .post(
                ApiVersion::V1Beta1,
                &format!("{store}:upsertExamples"),
                &[],
                request,
            )
            .await
    }

    /// Page through examples matching the request
    pub fn fetch_examples(&self, request: &FetchExamplesRequest) -> Result<Pager<Example>> {
        let store = require("example_store", &request.example_store)?;
        Ok(Pager::post::<FetchExamplesResponse>(
            self.client.clone(),
            ApiVersion::V1Beta1,
            format!("{store}:fetchExamples"),
            serde_json::to_value(request)?,
        ))
    }

    /// Delete examples by id or filter
    pub async fn remove_examples(
        &self,
        request: &RemoveExamplesRequest,
    ) -> Result<RemoveExamplesResponse> {
        let store = require("example_store", &request.example_store)?;
        if request.example_ids.is_empty() && request.stored_contents_example_filter.is_none() {
            return Err(CoreError::Validation(
                "either `example_ids` or `stored_contents_example_filter` is required".to_string(),
            ));
        }
        self.client
            .post(
                ApiVersion::V1Beta1,
                &format!("{store}:removeExamples"),
                &[],
                request,
            )
            .await
    }
}
