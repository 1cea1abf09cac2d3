//! Vector search indexes

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::Result;
use crate::lro::{Operation, OperationHandle};
use crate::names::require;
use crate::pagination::{PagedResponse, Pager};
use crate::wire::Empty;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A vector search index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_schema_uri: Option<String>,
    /// Algorithm config and contents location; shape depends on the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deployed_indexes: Vec<DeployedIndexRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_stats: Option<IndexStats>,
    /// `BATCH_UPDATE` or `STREAM_UPDATE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_update_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedIndexRef {
    #[serde(default)]
    pub index_endpoint: String,
    #[serde(default)]
    pub deployed_index_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub vectors_count: Option<i64>,
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub sparse_vectors_count: Option<i64>,
    #[serde(default)]
    pub shards_count: i32,
}

/// Parameters for listing indexes
///
/// ```rust
/// use vertexctl_core::services::ListIndexesParams;
///
/// let params = ListIndexesParams::new("projects/p/locations/us-central1")
///     .with_filter("labels.team=search")
///     .with_page_size(25);
/// assert_eq!(params.page_size, Some(25));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListIndexesParams {
    pub parent: String,
    pub filter: Option<String>,
    pub page_size: Option<i32>,
    /// Comma-separated field mask
    pub read_mask: Option<String>,
}

impl ListIndexesParams {
    #[must_use]
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    #[must_use]
    pub fn with_read_mask(mut self, mask: impl Into<String>) -> Self {
        self.read_mask = Some(mask.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIndexesResponse {
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl PagedResponse for ListIndexesResponse {
    type Item = Index;

    fn into_page(self) -> (Vec<Index>, Option<String>) {
        (self.indexes, self.next_page_token)
    }
}

/// Index operations
#[derive(Debug, Clone)]
pub struct IndexHandler {
    client: AiPlatformClient,
}

impl IndexHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    pub fn list_indexes(&self, params: &ListIndexesParams) -> Result<Pager<Index>> {
        let parent = require("parent", &params.parent)?;
        let mut query = Vec::new();
        if let Some(filter) = &params.filter {
            query.push(("filter", filter.clone()));
        }
        if let Some(size) = params.page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(mask) = &params.read_mask {
            query.push(("readMask", mask.clone()));
        }
        Ok(Pager::get::<ListIndexesResponse>(
            self.client.clone(),
            ApiVersion::V1,
            format!("{parent}/indexes"),
            query,
        ))
    }

    pub async fn get_index(&self, name: &str) -> Result<Index> {
        let name = require("name", name)?;
        self.client.get(ApiVersion::V1, name, &[]).await
    }

    /// Create an index under `parent`; the index is built asynchronously
    pub async fn create_index(&self, parent: &str, index: &Index) -> Result<OperationHandle<Index>> {
        let parent = require("parent", parent)?;
        require("index.display_name", &index.display_name)?;
        let operation: Operation = self
            .client
            .post(ApiVersion::V1, &format!("{parent}/indexes"), &[], index)
            .await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1,
            operation,
        ))
    }

    /// Delete an index; it must not be deployed
    pub async fn delete_index(&self, name: &str) -> Result<OperationHandle<Empty>> {
        let name = require("name", name)?;
        let operation: Operation = self.client.delete(ApiVersion::V1, name).await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1,
            operation,
        ))
    }
}
