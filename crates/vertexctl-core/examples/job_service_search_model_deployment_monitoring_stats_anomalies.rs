//! Search a model deployment monitoring job for feature anomalies (blocking)
//!
//! ```text
//! GOOGLE_CLOUD_PROJECT=my-project \
//! GOOGLE_OAUTH_ACCESS_TOKEN=$(gcloud auth print-access-token) \
//! MONITORING_JOB_ID=123 DEPLOYED_MODEL_ID=456 \
//! cargo run -p vertexctl-core --example job_service_search_model_deployment_monitoring_stats_anomalies
//! ```

use std::env;
use vertexctl_core::services::{
    JobServiceHandler, SearchModelDeploymentMonitoringStatsAnomaliesRequest,
};
use vertexctl_core::{BlockingClient, PlatformContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context = PlatformContext::from_env()?;
    let job_id = env::var("MONITORING_JOB_ID").unwrap_or_else(|_| "job_id_value".to_string());
    let deployed_model_id =
        env::var("DEPLOYED_MODEL_ID").unwrap_or_else(|_| "deployed_model_id_value".to_string());

    let blocking = BlockingClient::new()?;
    let handler = JobServiceHandler::new(context.client()?);

    let request = SearchModelDeploymentMonitoringStatsAnomaliesRequest::new(
        format!("{}/modelDeploymentMonitoringJobs/{job_id}", context.parent()),
        deployed_model_id,
    );

    let pager = handler.search_model_deployment_monitoring_stats_anomalies(&request)?;
    for anomalies in blocking.iter(pager) {
        println!("{:#?}", anomalies?);
    }
    Ok(())
}
