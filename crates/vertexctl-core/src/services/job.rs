//! Model deployment monitoring (job service)

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::Result;
use crate::names::require;
use crate::pagination::{PagedResponse, Pager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Objective filter for an anomaly search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsAnomaliesObjective {
    /// e.g. `RAW_FEATURE_SKEW`, `FEATURE_ATTRIBUTION_DRIFT`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub objective_type: Option<String>,
    /// Return only the top N features by anomaly score; 0 returns all
    #[serde(default, skip_serializing_if = "is_zero")]
    pub top_feature_count: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

/// Request for `searchModelDeploymentMonitoringStatsAnomalies`
///
/// # Example
///
/// ```rust
/// use vertexctl_core::services::SearchModelDeploymentMonitoringStatsAnomaliesRequest;
///
/// let request = SearchModelDeploymentMonitoringStatsAnomaliesRequest::new(
///     "projects/p/locations/us-central1/modelDeploymentMonitoringJobs/123",
///     "456",
/// )
/// .with_feature_display_name("age")
/// .with_page_size(50);
/// assert_eq!(request.page_size, Some(50));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchModelDeploymentMonitoringStatsAnomaliesRequest {
    /// Full job resource name; also used as the request path
    pub model_deployment_monitoring_job: String,
    pub deployed_model_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<StatsAnomaliesObjective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl SearchModelDeploymentMonitoringStatsAnomaliesRequest {
    #[must_use]
    pub fn new(job: impl Into<String>, deployed_model_id: impl Into<String>) -> Self {
        Self {
            model_deployment_monitoring_job: job.into(),
            deployed_model_id: deployed_model_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_feature_display_name(mut self, name: impl Into<String>) -> Self {
        self.feature_display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_objective(mut self, objective: StatsAnomaliesObjective) -> Self {
        self.objectives.push(objective);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Restrict the search to `[start, end)`
    #[must_use]
    pub fn with_time_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }
}

/// Anomalies for one objective of one deployed model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMonitoringStatsAnomalies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default)]
    pub deployed_model_id: String,
    #[serde(default)]
    pub anomaly_count: i32,
    #[serde(default)]
    pub feature_stats: Vec<FeatureHistoricStatsAnomalies>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureHistoricStatsAnomalies {
    #[serde(default)]
    pub feature_display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prediction_stats: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchModelDeploymentMonitoringStatsAnomaliesResponse {
    #[serde(default)]
    pub monitoring_stats: Vec<ModelMonitoringStatsAnomalies>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl PagedResponse for SearchModelDeploymentMonitoringStatsAnomaliesResponse {
    type Item = ModelMonitoringStatsAnomalies;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>) {
        (self.monitoring_stats, self.next_page_token)
    }
}

/// Job service operations
#[derive(Debug, Clone)]
pub struct JobServiceHandler {
    client: AiPlatformClient,
}

impl JobServiceHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    /// Search monitoring anomalies for a deployed model
    ///
    /// Nothing is sent until the returned pager is advanced.
    pub fn search_model_deployment_monitoring_stats_anomalies(
        &self,
        request: &SearchModelDeploymentMonitoringStatsAnomaliesRequest,
    ) -> Result<Pager<ModelMonitoringStatsAnomalies>> {
        let job = require(
            "model_deployment_monitoring_job",
            &request.model_deployment_monitoring_job,
        )?;
        require("deployed_model_id", &request.deployed_model_id)?;

        Ok(Pager::post::<SearchModelDeploymentMonitoringStatsAnomaliesResponse>(
            self.client.clone(),
            ApiVersion::V1,
            format!("{job}:searchModelDeploymentMonitoringStatsAnomalies"),
            serde_json::to_value(request)?,
        ))
    }
}
