//! Cluster view of a persistent resource

use super::images::parse_image_uri;
use super::resources::{AutoscalingSpec, PscIConfig, Resources};
use crate::services::persistent_resource::{PersistentResource, ResourcePool};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const HEAD_POOL_ID: &str = "head-node";
pub(crate) const DASHBOARD_URI_KEY: &str = "RAY_DASHBOARD_URI";
pub(crate) const HEAD_NODE_IP_KEY: &str = "RAY_HEAD_NODE_INTERNAL_IP";

/// A Ray cluster as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_resource_name: String,
    pub state: Option<String>,
    pub network: Option<String>,
    pub reserved_ip_ranges: Vec<String>,
    pub service_account: Option<String>,
    /// `None` for clusters running custom images
    pub python_version: Option<String>,
    /// `None` for clusters running custom images
    pub ray_version: Option<String>,
    pub head_node_type: Option<Resources>,
    pub worker_node_types: Vec<Resources>,
    pub dashboard_address: Option<String>,
    pub head_node_address: Option<String>,
    pub ray_metric_enabled: bool,
    pub ray_logs_enabled: bool,
    pub psc_interface_config: Option<PscIConfig>,
    pub labels: HashMap<String, String>,
}

impl Cluster {
    /// Build the cluster view; `None` when the resource carries no Ray spec
    pub fn from_persistent_resource(resource: &PersistentResource) -> Option<Self> {
        let runtime_spec = resource.resource_runtime_spec.as_ref()?;
        let ray_spec = runtime_spec.ray_spec.as_ref()?;

        let head_id = ray_spec
            .head_node_resource_pool_id
            .as_deref()
            .unwrap_or(HEAD_POOL_ID);
        let image_for = |pool: &ResourcePool| -> Option<String> {
            ray_spec
                .resource_pool_images
                .get(&pool.id)
                .or(ray_spec.image_uri.as_ref())
                .cloned()
        };

        let mut head_node_type = None;
        let mut worker_node_types = Vec::new();
        let mut versions = None;
        for pool in &resource.resource_pools {
            let image = image_for(pool);
            let parsed = image.as_deref().and_then(parse_image_uri);
            let node = pool_to_resources(pool, if parsed.is_some() { None } else { image });
            if pool.id == head_id {
                versions = parsed;
                head_node_type = Some(node);
            } else {
                worker_node_types.push(node);
            }
        }

        let access_uris = resource
            .resource_runtime
            .as_ref()
            .map(|runtime| &runtime.access_uris);
        let access_uri = |key: &str| access_uris.and_then(|uris| uris.get(key)).cloned();

        let (ray_version, python_version) = match versions {
            Some((ray, python)) => (Some(ray), Some(python)),
            None => (None, None),
        };

        Some(Self {
            cluster_resource_name: resource.name.clone(),
            state: resource.state.map(|state| state.to_string()),
            network: resource.network.clone().filter(|n| !n.is_empty()),
            reserved_ip_ranges: resource.reserved_ip_ranges.clone(),
            service_account: runtime_spec
                .service_account_spec
                .as_ref()
                .filter(|spec| spec.enable_custom_service_account)
                .and_then(|spec| spec.service_account.clone()),
            python_version,
            ray_version,
            head_node_type,
            worker_node_types,
            dashboard_address: access_uri(DASHBOARD_URI_KEY),
            head_node_address: access_uri(HEAD_NODE_IP_KEY),
            ray_metric_enabled: !ray_spec.ray_metric_spec.as_ref().is_some_and(|m| m.disabled),
            ray_logs_enabled: !ray_spec.ray_logs_spec.as_ref().is_some_and(|l| l.disabled),
            psc_interface_config: resource
                .psc_interface_config
                .as_ref()
                .map(|config| PscIConfig {
                    network_attachment: config.network_attachment.clone(),
                }),
            labels: resource.labels.clone(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.state.as_deref() == Some("RUNNING")
    }
}

fn pool_to_resources(pool: &ResourcePool, custom_image: Option<String>) -> Resources {
    let defaults = Resources::default();
    let autoscaling_spec = pool.autoscaling_spec.as_ref().and_then(|spec| {
        Some(AutoscalingSpec {
            min_replica_count: spec.min_replica_count?,
            max_replica_count: spec.max_replica_count?,
        })
    });
    Resources {
        machine_type: pool.machine_spec.machine_type.clone(),
        node_count: pool.replica_count.unwrap_or(0),
        accelerator_type: pool.machine_spec.accelerator_type.clone(),
        accelerator_count: pool.machine_spec.accelerator_count,
        boot_disk_type: pool
            .disk_spec
            .as_ref()
            .map(|disk| disk.boot_disk_type.clone())
            .unwrap_or(defaults.boot_disk_type),
        boot_disk_size_gb: pool
            .disk_spec
            .as_ref()
            .map(|disk| disk.boot_disk_size_gb)
            .unwrap_or(defaults.boot_disk_size_gb),
        custom_image,
        autoscaling_spec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn resource(value: serde_json::Value) -> PersistentResource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reconstructs_prebuilt_cluster() {
        let cluster = Cluster::from_persistent_resource(&resource(json!({
            "name": "projects/123/locations/us-central1/persistentResources/ray-1",
            "state": "RUNNING",
            "network": "projects/123/global/networks/default",
            "resourcePools": [
                {
                    "id": "head-node",
                    "machineSpec": {"machineType": "n1-standard-16"},
                    "replicaCount": "1",
                    "diskSpec": {"bootDiskType": "pd-ssd", "bootDiskSizeGb": 100}
                },
                {
                    "id": "worker-pool1",
                    "machineSpec": {"machineType": "n1-standard-8", "acceleratorType": "NVIDIA_TESLA_T4", "acceleratorCount": 1},
                    "replicaCount": "2",
                    "autoscalingSpec": {"minReplicaCount": "2", "maxReplicaCount": "4"}
                }
            ],
            "resourceRuntimeSpec": {
                "raySpec": {
                    "resourcePoolImages": {
                        "head-node": "us-docker.pkg.dev/vertex-ai/training/ray-cpu.2-33.py310:latest",
                        "worker-pool1": "us-docker.pkg.dev/vertex-ai/training/ray-gpu.2-33.py310:latest"
                    },
                    "headNodeResourcePoolId": "head-node",
                    "rayLogsSpec": {"disabled": true}
                },
                "serviceAccountSpec": {"enableCustomServiceAccount": true, "serviceAccount": "sa@p.iam.gserviceaccount.com"}
            },
            "resourceRuntime": {
                "accessUris": {
                    "RAY_DASHBOARD_URI": "abc-dot-us-central1.aiplatform-training.googleusercontent.com",
                    "RAY_HEAD_NODE_INTERNAL_IP": "10.0.0.2:10001"
                }
            }
        })))
        .unwrap();

        assert_eq!(cluster.ray_version.as_deref(), Some("2.33"));
        assert_eq!(cluster.python_version.as_deref(), Some("3.10"));
        assert!(cluster.is_running());
        assert!(cluster.ray_metric_enabled);
        assert!(!cluster.ray_logs_enabled);
        assert_eq!(
            cluster.service_account.as_deref(),
            Some("sa@p.iam.gserviceaccount.com")
        );
        assert_eq!(cluster.head_node_address.as_deref(), Some("10.0.0.2:10001"));
        assert_eq!(cluster.head_node_type.as_ref().unwrap().node_count, 1);
        assert_eq!(cluster.worker_node_types.len(), 1);
        let worker = &cluster.worker_node_types[0];
        assert_eq!(worker.node_count, 2);
        assert_eq!(
            worker.autoscaling_spec,
            Some(AutoscalingSpec {
                min_replica_count: 2,
                max_replica_count: 4
            })
        );
        assert!(worker.custom_image.is_none());
    }

    #[test]
    fn test_custom_images_leave_versions_empty() {
        let cluster = Cluster::from_persistent_resource(&resource(json!({
            "name": "projects/1/locations/us-central1/persistentResources/custom",
            "resourcePools": [{"id": "head-node", "machineSpec": {"machineType": "n1-standard-4"}, "replicaCount": 1}],
            "resourceRuntimeSpec": {"raySpec": {"imageUri": "gcr.io/acme/ray:1"}}
        })))
        .unwrap();
        assert_eq!(cluster.ray_version, None);
        assert_eq!(cluster.python_version, None);
        assert_eq!(
            cluster.head_node_type.unwrap().custom_image.as_deref(),
            Some("gcr.io/acme/ray:1")
        );
        assert!(cluster.dashboard_address.is_none());
    }

    #[test]
    fn test_non_ray_resource_is_skipped() {
        assert!(Cluster::from_persistent_resource(&resource(json!({
            "name": "projects/1/locations/l/persistentResources/training",
            "resourcePools": [{"id": "pool", "machineSpec": {"machineType": "n1-standard-4"}}]
        })))
        .is_none());
    }
}
