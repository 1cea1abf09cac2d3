//! Node shapes for Ray clusters

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MACHINE_TYPE: &str = "n1-standard-16";
pub const DEFAULT_BOOT_DISK_TYPE: &str = "pd-ssd";
pub const DEFAULT_BOOT_DISK_SIZE_GB: i32 = 100;
const MAX_BOOT_DISK_SIZE_GB: i32 = 64_000;

/// Machines backing one resource pool
///
/// ```rust
/// use vertexctl_core::ray::Resources;
///
/// let gpu_workers = Resources::default()
///     .with_machine_type("n1-standard-8")
///     .with_node_count(2)
///     .with_accelerator("NVIDIA_TESLA_T4", 1);
/// assert!(gpu_workers.has_accelerator());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub machine_type: String,
    /// Fixed replica count; the initial count when autoscaling
    pub node_count: i64,
    pub accelerator_type: Option<String>,
    pub accelerator_count: i32,
    pub boot_disk_type: String,
    pub boot_disk_size_gb: i32,
    /// Image for this pool only, overriding the cluster-wide image
    pub custom_image: Option<String>,
    pub autoscaling_spec: Option<AutoscalingSpec>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            machine_type: DEFAULT_MACHINE_TYPE.to_string(),
            node_count: 1,
            accelerator_type: None,
            accelerator_count: 0,
            boot_disk_type: DEFAULT_BOOT_DISK_TYPE.to_string(),
            boot_disk_size_gb: DEFAULT_BOOT_DISK_SIZE_GB,
            custom_image: None,
            autoscaling_spec: None,
        }
    }
}

/// Replica bounds for an autoscaling worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalingSpec {
    pub min_replica_count: i64,
    pub max_replica_count: i64,
}

/// Images for the head and worker pools, replacing the prebuilt ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeImages {
    pub head: String,
    pub worker: String,
}

/// Private Service Connect interface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PscIConfig {
    pub network_attachment: String,
}

/// Which pool a node shape is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRole {
    Head,
    Worker,
    /// Worker replica counts during an update may drop to zero
    ResizedWorker,
}

impl Resources {
    #[must_use]
    pub fn with_machine_type(mut self, machine_type: impl Into<String>) -> Self {
        self.machine_type = machine_type.into();
        self
    }

    #[must_use]
    pub fn with_node_count(mut self, node_count: i64) -> Self {
        self.node_count = node_count;
        self
    }

    #[must_use]
    pub fn with_accelerator(mut self, accelerator_type: impl Into<String>, count: i32) -> Self {
        self.accelerator_type = Some(accelerator_type.into());
        self.accelerator_count = count;
        self
    }

    #[must_use]
    pub fn with_boot_disk(mut self, disk_type: impl Into<String>, size_gb: i32) -> Self {
        self.boot_disk_type = disk_type.into();
        self.boot_disk_size_gb = size_gb;
        self
    }

    #[must_use]
    pub fn with_custom_image(mut self, image: impl Into<String>) -> Self {
        self.custom_image = Some(image.into());
        self
    }

    /// Autoscale between `min` and `max` replicas, starting at `min`
    #[must_use]
    pub fn with_autoscaling(mut self, min: i64, max: i64) -> Self {
        self.autoscaling_spec = Some(AutoscalingSpec {
            min_replica_count: min,
            max_replica_count: max,
        });
        self.node_count = min;
        self
    }

    pub fn has_accelerator(&self) -> bool {
        self.accelerator_type.is_some() && self.accelerator_count > 0
    }

    /// Replica count sent on create
    pub(crate) fn initial_replica_count(&self) -> i64 {
        self.autoscaling_spec
            .map(|spec| spec.min_replica_count)
            .unwrap_or(self.node_count)
    }

    pub(crate) fn validate(&self, role: NodeRole) -> Result<()> {
        let label = match role {
            NodeRole::Head => "head_node_type",
            NodeRole::Worker | NodeRole::ResizedWorker => "worker_node_types",
        };

        if self.machine_type.trim().is_empty() {
            return Err(CoreError::missing(&format!("{label}.machine_type")));
        }

        match (&self.accelerator_type, self.accelerator_count) {
            (Some(_), n) if n <= 0 => {
                return Err(CoreError::Validation(format!(
                    "{label}: accelerator_type is set but accelerator_count is {n}"
                )));
            }
            (None, n) if n != 0 => {
                return Err(CoreError::Validation(format!(
                    "{label}: accelerator_count is {n} but no accelerator_type is set"
                )));
            }
            _ => {}
        }

        if !(DEFAULT_BOOT_DISK_SIZE_GB..=MAX_BOOT_DISK_SIZE_GB).contains(&self.boot_disk_size_gb) {
            return Err(CoreError::Validation(format!(
                "{label}: boot_disk_size_gb must be between {DEFAULT_BOOT_DISK_SIZE_GB} and \
                 {MAX_BOOT_DISK_SIZE_GB}, got {}",
                self.boot_disk_size_gb
            )));
        }

        match role {
            NodeRole::Head => {
                if self.node_count != 1 {
                    return Err(CoreError::Validation(format!(
                        "head_node_type.node_count must be 1, got {}",
                        self.node_count
                    )));
                }
                if self.autoscaling_spec.is_some() {
                    return Err(CoreError::Validation(
                        "head_node_type does not support autoscaling".to_string(),
                    ));
                }
            }
            NodeRole::Worker => {
                if self.autoscaling_spec.is_none() && self.node_count < 1 {
                    return Err(CoreError::Validation(format!(
                        "worker_node_types.node_count must be at least 1, got {}",
                        self.node_count
                    )));
                }
            }
            NodeRole::ResizedWorker => {
                if self.node_count < 0 {
                    return Err(CoreError::Validation(format!(
                        "worker_node_types.node_count cannot be negative, got {}",
                        self.node_count
                    )));
                }
            }
        }

        if let Some(spec) = self.autoscaling_spec {
            if spec.min_replica_count < 1 {
                return Err(CoreError::Validation(format!(
                    "{label}: autoscaling min_replica_count must be at least 1, got {}",
                    spec.min_replica_count
                )));
            }
            if spec.max_replica_count < spec.min_replica_count {
                return Err(CoreError::Validation(format!(
                    "{label}: autoscaling max_replica_count ({}) is below min_replica_count ({})",
                    spec.max_replica_count, spec.min_replica_count
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_for_both_roles() {
        assert!(Resources::default().validate(NodeRole::Head).is_ok());
        assert!(Resources::default().validate(NodeRole::Worker).is_ok());
    }

    #[test]
    fn test_head_rules() {
        let two = Resources::default().with_node_count(2);
        assert!(two.validate(NodeRole::Head).unwrap_err().to_string().contains("must be 1"));

        let scaled = Resources::default().with_autoscaling(1, 3).with_node_count(1);
        assert!(scaled.validate(NodeRole::Head).is_err());
    }

    #[test]
    fn test_accelerator_pairing() {
        let mut missing_count = Resources::default();
        missing_count.accelerator_type = Some("NVIDIA_TESLA_T4".to_string());
        assert!(missing_count.validate(NodeRole::Worker).is_err());

        let mut missing_type = Resources::default();
        missing_type.accelerator_count = 2;
        assert!(missing_type.validate(NodeRole::Worker).is_err());

        let paired = Resources::default().with_accelerator("NVIDIA_TESLA_T4", 2);
        assert!(paired.validate(NodeRole::Worker).is_ok());
    }

    #[test]
    fn test_boot_disk_bounds() {
        let small = Resources::default().with_boot_disk("pd-ssd", 99);
        assert!(small.validate(NodeRole::Worker).is_err());
        let large = Resources::default().with_boot_disk("pd-ssd", 64_001);
        assert!(large.validate(NodeRole::Worker).is_err());
        let edge = Resources::default().with_boot_disk("pd-standard", 64_000);
        assert!(edge.validate(NodeRole::Worker).is_ok());
    }

    #[test]
    fn test_autoscaling_bounds() {
        let zero_min = Resources::default().with_autoscaling(0, 2);
        assert!(zero_min.validate(NodeRole::Worker).is_err());
        let inverted = Resources::default().with_autoscaling(3, 2);
        assert!(inverted.validate(NodeRole::Worker).is_err());
        let ok = Resources::default().with_autoscaling(1, 4);
        assert!(ok.validate(NodeRole::Worker).is_ok());
        assert_eq!(ok.initial_replica_count(), 1);
    }

    #[test]
    fn test_resize_may_reach_zero() {
        let idle = Resources::default().with_node_count(0);
        assert!(idle.validate(NodeRole::Worker).is_err());
        assert!(idle.validate(NodeRole::ResizedWorker).is_ok());
    }
}
