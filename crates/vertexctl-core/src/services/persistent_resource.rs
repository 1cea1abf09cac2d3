//! Persistent resources
//!
//! A persistent resource reserves machines in resource pools. Ray clusters
//! are persistent resources whose runtime spec carries a Ray spec; see
//! [`crate::ray`] for the cluster-level view.

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::Result;
use crate::lro::{Operation, OperationHandle, Status};
use crate::names::require;
use crate::pagination::{PagedResponse, Pager};
use crate::wire::Empty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentResource {
    /// Output only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub resource_pools: Vec<ResourcePool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PersistentResourceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
    /// Full VPC network name to peer with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psc_interface_config: Option<PscInterfaceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_spec: Option<EncryptionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_runtime_spec: Option<ResourceRuntimeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_runtime: Option<ResourceRuntime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_ip_ranges: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistentResourceState {
    StateUnspecified,
    Provisioning,
    Running,
    Stopping,
    Error,
    Rebooting,
    Updating,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for PersistentResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PersistentResourceState::StateUnspecified => "STATE_UNSPECIFIED",
            PersistentResourceState::Provisioning => "PROVISIONING",
            PersistentResourceState::Running => "RUNNING",
            PersistentResourceState::Stopping => "STOPPING",
            PersistentResourceState::Error => "ERROR",
            PersistentResourceState::Rebooting => "REBOOTING",
            PersistentResourceState::Updating => "UPDATING",
            PersistentResourceState::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePool {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub machine_spec: MachineSpec,
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub replica_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_spec: Option<DiskSpec>,
    /// Output only
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub used_replica_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling_spec: Option<AutoscalingSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    #[serde(default)]
    pub machine_type: String,
    /// e.g. `NVIDIA_TESLA_T4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub accelerator_count: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpec {
    #[serde(default)]
    pub boot_disk_type: String,
    #[serde(default)]
    pub boot_disk_size_gb: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingSpec {
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub min_replica_count: Option<i64>,
    #[serde(default, with = "crate::wire::int64", skip_serializing_if = "Option::is_none")]
    pub max_replica_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PscInterfaceConfig {
    #[serde(default)]
    pub network_attachment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionSpec {
    #[serde(default)]
    pub kms_key_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRuntimeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_spec: Option<ServiceAccountSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray_spec: Option<RaySpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSpec {
    #[serde(default)]
    pub enable_custom_service_account: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaySpec {
    /// Image shared by every pool unless overridden per pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Pool id to image URI
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub resource_pool_images: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_node_resource_pool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray_metric_spec: Option<RayMetricSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray_logs_spec: Option<RayLogsSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayMetricSpec {
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayLogsSpec {
    #[serde(default)]
    pub disabled: bool,
}

/// Output only runtime details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRuntime {
    /// e.g. `RAY_DASHBOARD_URI`, `RAY_HEAD_NODE_INTERNAL_IP`
    #[serde(default)]
    pub access_uris: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPersistentResourcesResponse {
    #[serde(default)]
    pub persistent_resources: Vec<PersistentResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl PagedResponse for ListPersistentResourcesResponse {
    type Item = PersistentResource;

    fn into_page(self) -> (Vec<PersistentResource>, Option<String>) {
        (self.persistent_resources, self.next_page_token)
    }
}

/// Persistent resource operations
#[derive(Debug, Clone)]
pub struct PersistentResourceHandler {
    client: AiPlatformClient,
}

impl PersistentResourceHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    /// Create `persistent_resource_id` under `parent`
    pub async fn create(
        &self,
        parent: &str,
        persistent_resource_id: &str,
        resource: &PersistentResource,
    ) -> Result<OperationHandle<PersistentResource>> {
        let parent = require("parent", parent)?;
        let id = require("persistent_resource_id", persistent_resource_id)?;
        let operation: Operation = self
            .client
            .post(
                ApiVersion::V1,
                &format!("{parent}/persistentResources"),
                &[("persistentResourceId", id.to_string())],
                resource,
            )
            .await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1,
            operation,
        ))
    }

    pub async fn get(&self, name: &str) -> Result<PersistentResource> {
        let name = require("name", name)?;
        self.client.get(ApiVersion::V1, name, &[]).await
    }

    pub fn list(&self, parent: &str, page_size: Option<i32>) -> Result<Pager<PersistentResource>> {
        let parent = require("parent", parent)?;
        let query = page_size
            .map(|size| vec![("pageSize", size.to_string())])
            .unwrap_or_default();
        Ok(Pager::get::<ListPersistentResourcesResponse>(
            self.client.clone(),
            ApiVersion::V1,
            format!("{parent}/persistentResources"),
            query,
        ))
    }

    /// Patch the fields named in `update_mask` (comma separated)
    pub async fn update(
        &self,
        resource: &PersistentResource,
        update_mask: &str,
    ) -> Result<OperationHandle<PersistentResource>> {
        let name = require("persistent_resource.name", &resource.name)?;
        let mask = require("update_mask", update_mask)?;
        let operation: Operation = self
            .client
            .patch(
                ApiVersion::V1,
                name,
                &[("updateMask", mask.to_string())],
                resource,
            )
            .await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1,
            operation,
        ))
    }

    pub async fn delete(&self, name: &str) -> Result<OperationHandle<Empty>> {
        let name = require("name", name)?;
        let operation: Operation = self.client.delete(ApiVersion::V1, name).await?;
        Ok(OperationHandle::new(
            self.client.clone(),
            ApiVersion::V1,
            operation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_running_cluster() {
        let resource: PersistentResource = serde_json::from_value(json!({
            "name": "projects/123/locations/us-central1/persistentResources/ray-1",
            "state": "RUNNING",
            "resourcePools": [
                {"id": "head-node", "machineSpec": {"machineType": "n1-standard-16"}, "replicaCount": "1"},
                {"id": "worker-pool1", "machineSpec": {"machineType": "n1-standard-8", "acceleratorType": "NVIDIA_TESLA_T4", "acceleratorCount": 1}, "replicaCount": 2}
            ],
            "resourceRuntimeSpec": {"raySpec": {"headNodeResourcePoolId": "head-node"}},
            "resourceRuntime": {"accessUris": {"RAY_DASHBOARD_URI": "abc.dashboard.googleusercontent.com"}}
        }))
        .unwrap();
        assert_eq!(resource.state, Some(PersistentResourceState::Running));
        assert_eq!(resource.resource_pools[0].replica_count, Some(1));
        assert_eq!(resource.resource_pools[1].replica_count, Some(2));
        assert_eq!(resource.resource_pools[1].machine_spec.accelerator_count, 1);
    }

    #[test]
    fn test_unknown_state_is_tolerated() {
        let resource: PersistentResource =
            serde_json::from_value(json!({"state": "HIBERNATING"})).unwrap();
        assert_eq!(resource.state, Some(PersistentResourceState::Unknown));
    }
}
