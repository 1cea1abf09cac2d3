//! Model monitoring job commands

use crate::cli::JobCommands;
use crate::commands::OutputOptions;
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, VertexCtlError};
use crate::output::OutputFormat;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use vertexctl_core::names::qualify;
use vertexctl_core::services::{
    JobServiceHandler, SearchModelDeploymentMonitoringStatsAnomaliesRequest,
};

/// Handle monitoring job commands
pub async fn handle_job_command(
    cmd: &JobCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let parent = context.parent();
    let handler = JobServiceHandler::new(client);

    match cmd {
        JobCommands::SearchAnomalies {
            job,
            deployed_model_id,
            feature,
            page_size,
            start,
            end,
        } => {
            let mut request = SearchModelDeploymentMonitoringStatsAnomaliesRequest::new(
                qualify(&parent, "modelDeploymentMonitoringJobs", job),
                deployed_model_id,
            );
            if let Some(feature) = feature {
                request = request.with_feature_display_name(feature);
            }
            if let Some(size) = page_size {
                request = request.with_page_size(*size);
            }
            if let (Some(start), Some(end)) = (start, end) {
                request = request.with_time_range(parse_time(start)?, parse_time(end)?);
            }

            let anomalies = handler
                .search_model_deployment_monitoring_stats_anomalies(&request)?
                .collect()
                .await?;

            if out.is_structured() || out.query.is_some() {
                return out.print(anomalies, OutputFormat::Json);
            }
            if anomalies.is_empty() {
                println!("No monitoring stats found");
                return Ok(());
            }
            let rows: Vec<Value> = anomalies
                .iter()
                .flat_map(|stats| {
                    stats.feature_stats.iter().map(move |feature| {
                        json!({
                            "objective": stats.objective,
                            "feature": feature.feature_display_name,
                            "prediction_windows": feature.prediction_stats.len(),
                            "anomalies": stats.anomaly_count,
                        })
                    })
                })
                .collect();
            out.print(rows, OutputFormat::Table)
        }
    }
}

/// RFC 3339 timestamp from the command line
fn parse_time(value: &str) -> CliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| VertexCtlError::InvalidInput {
            message: format!("'{}' is not an RFC 3339 timestamp: {}", value, e),
        })
}
