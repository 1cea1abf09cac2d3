//! Ray on Vertex: managed Ray clusters
//!
//! A Ray cluster is a persistent resource whose runtime spec carries a Ray
//! spec. The head node lives in pool `head-node`; workers live in
//! `worker-pool1`, `worker-pool2`, and so on.
//!
//! ```rust,ignore
//! use vertexctl_core::ray::{self, CreateClusterParams};
//!
//! let name = ray::create_ray_cluster(&client, &parent, &CreateClusterParams::new(), &poll, None).await?;
//! let cluster = ray::get_ray_cluster(&client, &name).await?;
//! println!("dashboard: {:?}", cluster.dashboard_address);
//! ray::delete_ray_cluster(&client, &name, &poll, None).await?;
//! ```

pub mod cluster;
pub mod dashboard;
pub mod images;
pub mod lifecycle;
pub mod resources;

pub use cluster::Cluster;
pub use dashboard::{JobSubmissionClusterInfo, job_submission_cluster_info};
pub use lifecycle::{
    CreateClusterParams, create_ray_cluster, delete_ray_cluster, get_ray_cluster,
    list_ray_clusters, update_ray_cluster,
};
pub use resources::{AutoscalingSpec, NodeImages, PscIConfig, Resources};
