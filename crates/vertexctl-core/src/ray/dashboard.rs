//! Job submission details for a running cluster's dashboard

use super::cluster::Cluster;
use super::lifecycle::get_ray_cluster;
use crate::client::AiPlatformClient;
use crate::error::{CoreError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Address scheme accepted in place of a bare resource name
pub const VERTEX_RAY_SCHEME: &str = "vertex_ray://";

/// What a Ray job submission client needs to reach the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSubmissionClusterInfo {
    /// `https://` dashboard address
    pub address: String,
    /// Headers to attach to every dashboard request
    pub headers: HashMap<String, String>,
    pub cluster: Cluster,
}

/// Resolve the dashboard address and auth headers for a cluster
///
/// `address` is a full persistent resource name, optionally prefixed with
/// `vertex_ray://`. The cluster must be running and expose a dashboard.
pub async fn job_submission_cluster_info(
    client: &AiPlatformClient,
    address: &str,
) -> Result<JobSubmissionClusterInfo> {
    let name = address.strip_prefix(VERTEX_RAY_SCHEME).unwrap_or(address);
    if !name.starts_with("projects/") {
        return Err(CoreError::Validation(format!(
            "address '{address}' must be a persistent resource name, \
             e.g. vertex_ray://projects/<project>/locations/<location>/persistentResources/<id>"
        )));
    }

    let cluster = get_ray_cluster(client, name).await?;
    if !cluster.is_running() {
        return Err(CoreError::Validation(format!(
            "Ray cluster {} is not running (state: {})",
            cluster.cluster_resource_name,
            cluster.state.as_deref().unwrap_or("unknown")
        )));
    }
    let dashboard = cluster.dashboard_address.clone().ok_or_else(|| {
        CoreError::Validation(format!(
            "Ray cluster {} does not expose a dashboard address",
            cluster.cluster_resource_name
        ))
    })?;

    let address = if dashboard.starts_with("http://") || dashboard.starts_with("https://") {
        dashboard
    } else {
        format!("https://{dashboard}")
    };

    let mut headers = HashMap::new();
    if let Some(token) = client.access_token() {
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
    }

    Ok(JobSubmissionClusterInfo {
        address,
        headers,
        cluster,
    })
}
