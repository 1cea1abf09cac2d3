//! Ray cluster lifecycle: create, get, list, update, delete
//!
//! Every verb re-reads the service; nothing about a cluster is cached
//! locally. Mutating verbs wait for the backing operation before returning.

use super::cluster::{Cluster, HEAD_POOL_ID};
use super::images::{
    DEFAULT_PYTHON_VERSION, DEFAULT_RAY_VERSION, default_image_uri, validate_versions,
};
use super::resources::{NodeImages, NodeRole, PscIConfig, Resources};
use crate::client::AiPlatformClient;
use crate::error::{CoreError, Result};
use crate::lro::{PollConfig, ProgressCallback};
use crate::names::{child_path, is_valid_resource_id, require, segment_value};
use crate::services::persistent_resource::{
    self as pr, DiskSpec, EncryptionSpec, MachineSpec, PersistentResource,
    PersistentResourceHandler, RayLogsSpec, RayMetricSpec, RaySpec, ResourcePool,
    ResourceRuntimeSpec, ServiceAccountSpec,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

/// Update mask used when resizing worker pools
pub const REPLICA_COUNT_MASK: &str = "resource_pools.replica_count";

/// Parameters for creating a Ray cluster
///
/// # Example
///
/// ```rust,ignore
/// use vertexctl_core::ray::{CreateClusterParams, Resources, create_ray_cluster};
///
/// let params = CreateClusterParams::new()
///     .with_cluster_name("my-cluster")
///     .with_worker_node_types(vec![
///         Resources::default().with_node_count(2).with_accelerator("NVIDIA_TESLA_T4", 1),
///     ]);
///
/// let name = create_ray_cluster(&client, &parent, &params, &PollConfig::default(), None).await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CreateClusterParams {
    pub head_node_type: Resources,
    pub worker_node_types: Vec<Resources>,
    pub python_version: String,
    pub ray_version: String,
    /// Full VPC network name to peer with
    pub network: Option<String>,
    pub service_account: Option<String>,
    /// Resource id; defaults to `ray-cluster-<timestamp>`
    pub cluster_name: Option<String>,
    pub custom_images: Option<NodeImages>,
    pub enable_metrics_collection: bool,
    pub enable_logging: bool,
    pub psc_interface_config: Option<PscIConfig>,
    pub reserved_ip_ranges: Vec<String>,
    pub labels: HashMap<String, String>,
    pub encryption_spec_key_name: Option<String>,
}

impl Default for CreateClusterParams {
    fn default() -> Self {
        Self {
            head_node_type: Resources::default(),
            worker_node_types: vec![Resources::default()],
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            ray_version: DEFAULT_RAY_VERSION.to_string(),
            network: None,
            service_account: None,
            cluster_name: None,
            custom_images: None,
            enable_metrics_collection: true,
            enable_logging: true,
            psc_interface_config: None,
            reserved_ip_ranges: Vec::new(),
            labels: HashMap::new(),
            encryption_spec_key_name: None,
        }
    }
}

impl CreateClusterParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_head_node_type(mut self, head: Resources) -> Self {
        self.head_node_type = head;
        self
    }

    #[must_use]
    pub fn with_worker_node_types(mut self, workers: Vec<Resources>) -> Self {
        self.worker_node_types = workers;
        self
    }

    #[must_use]
    pub fn with_versions(mut self, ray: impl Into<String>, python: impl Into<String>) -> Self {
        self.ray_version = ray.into();
        self.python_version = python.into();
        self
    }

    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    #[must_use]
    pub fn with_service_account(mut self, account: impl Into<String>) -> Self {
        self.service_account = Some(account.into());
        self
    }

    #[must_use]
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_custom_images(mut self, images: NodeImages) -> Self {
        self.custom_images = Some(images);
        self
    }

    #[must_use]
    pub fn with_metrics_collection(mut self, enabled: bool) -> Self {
        self.enable_metrics_collection = enabled;
        self
    }

    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    #[must_use]
    pub fn with_psc_interface_config(mut self, config: PscIConfig) -> Self {
        self.psc_interface_config = Some(config);
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_encryption_key(mut self, kms_key_name: impl Into<String>) -> Self {
        self.encryption_spec_key_name = Some(kms_key_name.into());
        self
    }

    /// Validate and build the resource id and request body
    ///
    /// `location` picks the image registry region. No network call is made.
    pub fn to_persistent_resource(&self, location: &str) -> Result<(String, PersistentResource)> {
        if self.network.is_some() && self.psc_interface_config.is_some() {
            return Err(CoreError::Validation(
                "network and psc_interface_config cannot both be set".to_string(),
            ));
        }

        self.head_node_type.validate(NodeRole::Head)?;
        for worker in &self.worker_node_types {
            worker.validate(NodeRole::Worker)?;
        }

        let uses_prebuilt = self.custom_images.is_none()
            && self.head_node_type.custom_image.is_none()
            && self.worker_node_types.iter().all(|w| w.custom_image.is_none());
        if uses_prebuilt {
            validate_versions(&self.ray_version, &self.python_version)?;
        }

        let cluster_id = match &self.cluster_name {
            Some(name) => {
                if !is_valid_resource_id(name) {
                    return Err(CoreError::Validation(format!(
                        "cluster_name '{name}' must match [a-z]([-a-z0-9]{{0,61}}[a-z0-9])?"
                    )));
                }
                name.clone()
            }
            None => default_cluster_name(),
        };

        let image_for = |node: &Resources, cluster_image: Option<&String>| -> String {
            node.custom_image
                .clone()
                .or_else(|| cluster_image.cloned())
                .unwrap_or_else(|| {
                    default_image_uri(
                        &self.ray_version,
                        &self.python_version,
                        location,
                        node.has_accelerator(),
                    )
                })
        };

        let mut pools = vec![to_pool(HEAD_POOL_ID.to_string(), &self.head_node_type)];
        let mut images = HashMap::new();
        images.insert(
            HEAD_POOL_ID.to_string(),
            image_for(
                &self.head_node_type,
                self.custom_images.as_ref().map(|i| &i.head),
            ),
        );
        for (i, worker) in self.worker_node_types.iter().enumerate() {
            let id = format!("worker-pool{}", i + 1);
            images.insert(
                id.clone(),
                image_for(worker, self.custom_images.as_ref().map(|i| &i.worker)),
            );
            pools.push(to_pool(id, worker));
        }

        let resource = PersistentResource {
            resource_pools: pools,
            labels: self.labels.clone(),
            network: self.network.clone(),
            psc_interface_config: self.psc_interface_config.as_ref().map(|config| {
                pr::PscInterfaceConfig {
                    network_attachment: config.network_attachment.clone(),
                }
            }),
            encryption_spec: self
                .encryption_spec_key_name
                .as_ref()
                .map(|key| EncryptionSpec {
                    kms_key_name: key.clone(),
                }),
            reserved_ip_ranges: self.reserved_ip_ranges.clone(),
            resource_runtime_spec: Some(ResourceRuntimeSpec {
                service_account_spec: self.service_account.as_ref().map(|account| {
                    ServiceAccountSpec {
                        enable_custom_service_account: true,
                        service_account: Some(account.clone()),
                    }
                }),
                ray_spec: Some(RaySpec {
                    image_uri: None,
                    resource_pool_images: images,
                    head_node_resource_pool_id: Some(HEAD_POOL_ID.to_string()),
                    ray_metric_spec: Some(RayMetricSpec {
                        disabled: !self.enable_metrics_collection,
                    }),
                    ray_logs_spec: Some(RayLogsSpec {
                        disabled: !self.enable_logging,
                    }),
                }),
            }),
            ..Default::default()
        };

        Ok((cluster_id, resource))
    }
}

fn default_cluster_name() -> String {
    format!(
        "ray-cluster-{}",
        Utc::now().format("%Y-%m-%d-%H-%M-%S-%3f")
    )
}

fn to_pool(id: String, node: &Resources) -> ResourcePool {
    ResourcePool {
        id,
        machine_spec: MachineSpec {
            machine_type: node.machine_type.clone(),
            accelerator_type: node.accelerator_type.clone(),
            accelerator_count: node.accelerator_count,
        },
        replica_count: Some(node.initial_replica_count()),
        disk_spec: Some(DiskSpec {
            boot_disk_type: node.boot_disk_type.clone(),
            boot_disk_size_gb: node.boot_disk_size_gb,
        }),
        used_replica_count: None,
        autoscaling_spec: node.autoscaling_spec.map(|spec| pr::AutoscalingSpec {
            min_replica_count: Some(spec.min_replica_count),
            max_replica_count: Some(spec.max_replica_count),
        }),
    }
}

/// Create a Ray cluster and wait until it is provisioned
///
/// # Arguments
///
/// * `client` - The API client
/// * `parent` - `projects/{project}/locations/{location}`
/// * `params` - Cluster shape
/// * `poll` - Poll cadence and optional timeout for the create operation
/// * `on_progress` - Optional callback for progress updates
///
/// # Returns
///
/// The cluster's full resource name.
pub async fn create_ray_cluster(
    client: &AiPlatformClient,
    parent: &str,
    params: &CreateClusterParams,
    poll: &PollConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String> {
    let parent = require("parent", parent)?;
    let location = segment_value(parent, "locations").ok_or_else(|| {
        CoreError::Validation(format!(
            "parent '{parent}' must look like projects/<project>/locations/<location>"
        ))
    })?;
    let (cluster_id, resource) = params.to_persistent_resource(location)?;

    info!("Creating Ray cluster {}", cluster_id);
    let handler = PersistentResourceHandler::new(client.clone());
    let created = handler
        .create(parent, &cluster_id, &resource)
        .await?
        .wait_with(poll, on_progress)
        .await?;

    Ok(if created.name.is_empty() {
        child_path(parent, "persistentResources", &cluster_id)
    } else {
        created.name
    })
}

/// Fetch one cluster by resource name
pub async fn get_ray_cluster(client: &AiPlatformClient, name: &str) -> Result<Cluster> {
    let resource = PersistentResourceHandler::new(client.clone())
        .get(name)
        .await?;
    Cluster::from_persistent_resource(&resource).ok_or_else(|| {
        CoreError::Validation(format!("{} is not a Ray cluster", resource.name))
    })
}

/// All Ray clusters under `parent`
///
/// Persistent resources without a Ray spec are skipped; an empty project
/// yields an empty vector.
pub async fn list_ray_clusters(client: &AiPlatformClient, parent: &str) -> Result<Vec<Cluster>> {
    let resources = PersistentResourceHandler::new(client.clone())
        .list(parent, None)?
        .collect()
        .await?;
    let clusters: Vec<Cluster> = resources
        .iter()
        .filter_map(Cluster::from_persistent_resource)
        .collect();
    debug!(
        "Found {} Ray clusters among {} persistent resources",
        clusters.len(),
        resources.len()
    );
    Ok(clusters)
}

/// Resize worker pools
///
/// `worker_node_types` must list one entry per existing worker pool, in
/// order; only `node_count` is applied. Autoscaling pools cannot be resized.
pub async fn update_ray_cluster(
    client: &AiPlatformClient,
    name: &str,
    worker_node_types: &[Resources],
    poll: &PollConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<String> {
    let handler = PersistentResourceHandler::new(client.clone());
    let mut resource = handler.get(name).await?;
    let cluster = Cluster::from_persistent_resource(&resource).ok_or_else(|| {
        CoreError::Validation(format!("{} is not a Ray cluster", resource.name))
    })?;

    if worker_node_types.len() != cluster.worker_node_types.len() {
        return Err(CoreError::Validation(format!(
            "cluster has {} worker pools but {} were given",
            cluster.worker_node_types.len(),
            worker_node_types.len()
        )));
    }
    for worker in worker_node_types {
        worker.validate(NodeRole::ResizedWorker)?;
    }

    let head_id = resource
        .resource_runtime_spec
        .as_ref()
        .and_then(|spec| spec.ray_spec.as_ref())
        .and_then(|ray| ray.head_node_resource_pool_id.clone())
        .unwrap_or_else(|| HEAD_POOL_ID.to_string());

    let mut requested = worker_node_types.iter();
    for pool in resource
        .resource_pools
        .iter_mut()
        .filter(|pool| pool.id != head_id)
    {
        let Some(wanted) = requested.next() else {
            break;
        };
        if pool.autoscaling_spec.is_some() {
            return Err(CoreError::Validation(format!(
                "worker pool {} uses autoscaling and cannot be resized",
                pool.id
            )));
        }
        pool.replica_count = Some(wanted.node_count);
    }

    let patch = PersistentResource {
        name: resource.name.clone(),
        resource_pools: resource.resource_pools,
        ..Default::default()
    };
    info!("Resizing worker pools of {}", patch.name);
    let updated = handler
        .update(&patch, REPLICA_COUNT_MASK)
        .await?
        .wait_with(poll, on_progress)
        .await?;

    Ok(if updated.name.is_empty() {
        patch.name
    } else {
        updated.name
    })
}

/// Delete a cluster and wait for the deletion to finish
pub async fn delete_ray_cluster(
    client: &AiPlatformClient,
    name: &str,
    poll: &PollConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    info!("Deleting Ray cluster {}", name);
    PersistentResourceHandler::new(client.clone())
        .delete(name)
        .await?
        .wait_with(poll, on_progress)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_build_two_pools() {
        let (id, resource) = CreateClusterParams::new()
            .with_cluster_name("demo")
            .to_persistent_resource("us-central1")
            .unwrap();
        assert_eq!(id, "demo");
        let ids: Vec<_> = resource.resource_pools.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["head-node", "worker-pool1"]);

        let ray = resource.resource_runtime_spec.unwrap().ray_spec.unwrap();
        assert_eq!(
            ray.resource_pool_images["head-node"],
            "us-docker.pkg.dev/vertex-ai/training/ray-cpu.2-33.py310:latest"
        );
        assert_eq!(ray.ray_metric_spec, Some(RayMetricSpec { disabled: false }));
        assert_eq!(ray.ray_logs_spec, Some(RayLogsSpec { disabled: false }));
    }

    #[test]
    fn test_gpu_pool_gets_gpu_image() {
        let (_, resource) = CreateClusterParams::new()
            .with_cluster_name("gpu")
            .with_worker_node_types(vec![
                Resources::default(),
                Resources::default().with_accelerator("NVIDIA_L4", 1),
            ])
            .to_persistent_resource("europe-west4")
            .unwrap();
        let ray = resource.resource_runtime_spec.unwrap().ray_spec.unwrap();
        assert!(ray.resource_pool_images["worker-pool1"].contains("ray-cpu"));
        assert!(ray.resource_pool_images["worker-pool2"].starts_with("europe-docker"));
        assert!(ray.resource_pool_images["worker-pool2"].contains("ray-gpu"));
    }

    #[test]
    fn test_network_and_psc_are_exclusive() {
        let err = CreateClusterParams::new()
            .with_network("projects/1/global/networks/default")
            .with_psc_interface_config(PscIConfig {
                network_attachment: "attachment".to_string(),
            })
            .to_persistent_resource("us-central1")
            .unwrap_err();
        assert!(err.to_string().contains("cannot both be set"));
    }

    #[test]
    fn test_custom_images_skip_version_checks() {
        let params = CreateClusterParams::new()
            .with_cluster_name("custom")
            .with_versions("1.0", "2.7");
        assert!(params.to_persistent_resource("us-central1").is_err());

        let (_, resource) = params
            .with_custom_images(NodeImages {
                head: "gcr.io/acme/head:1".to_string(),
                worker: "gcr.io/acme/worker:1".to_string(),
            })
            .to_persistent_resource("us-central1")
            .unwrap();
        let ray = resource.resource_runtime_spec.unwrap().ray_spec.unwrap();
        assert_eq!(ray.resource_pool_images["worker-pool1"], "gcr.io/acme/worker:1");
    }

    #[test]
    fn test_cluster_name_rules() {
        assert!(CreateClusterParams::new()
            .with_cluster_name("Bad_Name")
            .to_persistent_resource("us-central1")
            .is_err());

        let (generated, _) = CreateClusterParams::new()
            .to_persistent_resource("us-central1")
            .unwrap();
        assert!(generated.starts_with("ray-cluster-"));
        assert!(is_valid_resource_id(&generated));
    }

    #[test]
    fn test_autoscaling_worker_starts_at_min() {
        let (_, resource) = CreateClusterParams::new()
            .with_cluster_name("scaled")
            .with_worker_node_types(vec![Resources::default().with_autoscaling(2, 5)])
            .to_persistent_resource("us-central1")
            .unwrap();
        let worker = &resource.resource_pools[1];
        assert_eq!(worker.replica_count, Some(2));
        assert_eq!(
            worker.autoscaling_spec.as_ref().unwrap().max_replica_count,
            Some(5)
        );
    }

    #[test]
    fn test_service_account_and_labels() {
        let (_, resource) = CreateClusterParams::new()
            .with_cluster_name("sa")
            .with_service_account("sa@p.iam.gserviceaccount.com")
            .with_label("team", "ml")
            .with_metrics_collection(false)
            .to_persistent_resource("us-central1")
            .unwrap();
        let runtime = resource.resource_runtime_spec.unwrap();
        let account = runtime.service_account_spec.unwrap();
        assert!(account.enable_custom_service_account);
        assert_eq!(resource.labels["team"], "ml");
        assert_eq!(
            runtime.ray_spec.unwrap().ray_metric_spec,
            Some(RayMetricSpec { disabled: true })
        );
    }
}
