//! Ray cluster commands

use crate::cli::ClusterCommands;
use crate::commands::OutputOptions;
use crate::commands::async_utils::{poll_config, progress_spinner};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, VertexCtlError};
use crate::output::OutputFormat;
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::{Value, json};
use tracing::debug;
use vertexctl_core::names::qualify;
use vertexctl_core::ray::{self, Cluster, CreateClusterParams, Resources};

const COLLECTION: &str = "persistentResources";

/// Handle Ray cluster commands
pub async fn handle_cluster_command(
    cmd: &ClusterCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let parent = context.parent();

    match cmd {
        ClusterCommands::Create {
            name,
            head_machine_type,
            worker_machine_type,
            worker_count,
            worker_accelerator,
            worker_accelerator_count,
            autoscaling,
            ray_version,
            python_version,
            network,
            service_account,
            encryption_key,
            labels,
            no_metrics,
            no_logging,
            wait,
        } => {
            let mut head = Resources::default();
            if let Some(machine) = head_machine_type {
                head = head.with_machine_type(machine);
            }
            let mut worker = Resources::default().with_node_count(*worker_count);
            if let Some(machine) = worker_machine_type {
                worker = worker.with_machine_type(machine);
            }
            if let (Some(kind), Some(count)) = (worker_accelerator, worker_accelerator_count) {
                worker = worker.with_accelerator(kind, *count);
            }
            if let Some(&[min, max]) = autoscaling.as_deref() {
                worker = worker.with_autoscaling(min, max);
            }

            let mut params = CreateClusterParams::new()
                .with_head_node_type(head)
                .with_worker_node_types(vec![worker])
                .with_metrics_collection(!no_metrics)
                .with_logging(!no_logging);
            if let Some(name) = name {
                params = params.with_cluster_name(name);
            }
            if ray_version.is_some() || python_version.is_some() {
                let ray_ver = ray_version.clone().unwrap_or_else(|| params.ray_version.clone());
                let python = python_version
                    .clone()
                    .unwrap_or_else(|| params.python_version.clone());
                params = params.with_versions(ray_ver, python);
            }
            if let Some(network) = network {
                params = params.with_network(network);
            }
            if let Some(account) = service_account {
                params = params.with_service_account(account);
            }
            if let Some(key) = encryption_key {
                params = params.with_encryption_key(key);
            }
            for label in labels {
                let (key, value) = parse_label(label)?;
                params = params.with_label(key, value);
            }

            let poll = poll_config(&context.poll, wait.wait_timeout);
            let (pb, callback) = progress_spinner("Creating Ray cluster");
            let result =
                ray::create_ray_cluster(&client, &parent, &params, &poll, Some(callback)).await;
            pb.finish_and_clear();
            let cluster_name = result?;

            if out.is_structured() {
                out.print(json!({ "name": cluster_name }), OutputFormat::Json)
            } else {
                println!("{} Ray cluster {}", "Created".green(), cluster_name);
                Ok(())
            }
        }

        ClusterCommands::Get { name } => {
            let cluster = ray::get_ray_cluster(&client, &qualify(&parent, COLLECTION, name)).await?;
            out.print(cluster, OutputFormat::Json)
        }

        ClusterCommands::List => {
            let clusters = ray::list_ray_clusters(&client, &parent).await?;
            debug!("Listed {} clusters", clusters.len());
            if out.is_structured() || out.query.is_some() {
                out.print(clusters, OutputFormat::Json)
            } else if clusters.is_empty() {
                println!("No Ray clusters in {}", parent);
                Ok(())
            } else {
                let rows: Vec<Value> = clusters.iter().map(summary_row).collect();
                out.print(rows, OutputFormat::Table)
            }
        }

        ClusterCommands::Update {
            name,
            worker_count,
            wait,
        } => {
            let workers: Vec<Resources> = worker_count
                .iter()
                .map(|count| Resources::default().with_node_count(*count))
                .collect();
            let poll = poll_config(&context.poll, wait.wait_timeout);
            let (pb, callback) = progress_spinner("Resizing Ray cluster");
            let result = ray::update_ray_cluster(
                &client,
                &qualify(&parent, COLLECTION, name),
                &workers,
                &poll,
                Some(callback),
            )
            .await;
            pb.finish_and_clear();
            let cluster_name = result?;

            if out.is_structured() {
                out.print(json!({ "name": cluster_name }), OutputFormat::Json)
            } else {
                println!("{} Ray cluster {}", "Updated".green(), cluster_name);
                Ok(())
            }
        }

        ClusterCommands::Delete { name, force, wait } => {
            let full_name = qualify(&parent, COLLECTION, name);
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete Ray cluster {}?", full_name))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    return Err(VertexCtlError::Aborted);
                }
            }

            let poll = poll_config(&context.poll, wait.wait_timeout);
            let (pb, callback) = progress_spinner("Deleting Ray cluster");
            let result = ray::delete_ray_cluster(&client, &full_name, &poll, Some(callback)).await;
            pb.finish_and_clear();
            result?;

            if out.is_structured() {
                out.print(json!({ "name": full_name, "deleted": true }), OutputFormat::Json)
            } else {
                println!("{} Ray cluster {}", "Deleted".green(), full_name);
                Ok(())
            }
        }

        ClusterCommands::Dashboard { name } => {
            let address = if name.starts_with(ray::dashboard::VERTEX_RAY_SCHEME) {
                name.clone()
            } else {
                qualify(&parent, COLLECTION, name)
            };
            let info = ray::job_submission_cluster_info(&client, &address).await?;
            let mut header_names: Vec<&String> = info.headers.keys().collect();
            header_names.sort();
            out.print(
                json!({
                    "address": info.address,
                    "cluster": info.cluster.cluster_resource_name,
                    "headers": header_names,
                }),
                OutputFormat::Table,
            )
        }
    }
}

/// `KEY=VALUE` label from the command line
fn parse_label(label: &str) -> CliResult<(String, String)> {
    match label.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(VertexCtlError::InvalidInput {
            message: format!("label '{}' must look like KEY=VALUE", label),
        }),
    }
}

/// One table row per cluster
fn summary_row(cluster: &Cluster) -> Value {
    let workers: i64 = cluster.worker_node_types.iter().map(|w| w.node_count).sum();
    json!({
        "name": vertexctl_core::names::resource_id(&cluster.cluster_resource_name),
        "state": cluster.state,
        "ray": cluster.ray_version,
        "python": cluster.python_version,
        "workers": workers,
        "dashboard": cluster.dashboard_address,
    })
}
