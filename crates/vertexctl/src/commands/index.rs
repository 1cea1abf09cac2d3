//! Vector search index commands

use crate::cli::{AsyncOperationArgs, IndexCommands};
use crate::commands::OutputOptions;
use crate::commands::async_utils::{poll_config, wait_for_operation};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;
use colored::Colorize;
use serde_json::{Value, json};
use vertexctl_core::names::{qualify, resource_id};
use vertexctl_core::services::{Index, IndexHandler, ListIndexesParams};
use vertexctl_core::PlatformContext;

/// Handle index commands
pub async fn handle_index_command(
    cmd: &IndexCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let parent = context.parent();
    let handler = IndexHandler::new(client);

    match cmd {
        IndexCommands::List { filter, page_size } => {
            let mut params = ListIndexesParams::new(&parent);
            if let Some(filter) = filter {
                params = params.with_filter(filter);
            }
            if let Some(size) = page_size {
                params = params.with_page_size(*size);
            }
            let indexes = handler.list_indexes(&params)?.collect().await?;

            if out.is_structured() || out.query.is_some() {
                out.print(indexes, OutputFormat::Json)
            } else if indexes.is_empty() {
                println!("No indexes in {}", parent);
                Ok(())
            } else {
                let rows: Vec<Value> = indexes.iter().map(summary_row).collect();
                out.print(rows, OutputFormat::Table)
            }
        }

        IndexCommands::Get { name } => {
            let index = handler
                .get_index(&qualify(&parent, "indexes", name))
                .await?;
            out.print(index, OutputFormat::Json)
        }

        IndexCommands::Delete { name, async_ops } => {
            let full_name = qualify(&parent, "indexes", name);
            let operation = handler.delete_index(&full_name).await?;
            finish_delete(operation, &context, &full_name, async_ops, out).await
        }
    }
}

/// Print an operation name, or wait for the delete when `--wait` is set
pub(crate) async fn finish_delete(
    operation: vertexctl_core::OperationHandle<vertexctl_core::wire::Empty>,
    context: &PlatformContext,
    full_name: &str,
    async_ops: &AsyncOperationArgs,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    if !async_ops.wait {
        let operation_name = operation.name().to_string();
        return if out.is_structured() {
            out.print(json!({ "operation": operation_name }), OutputFormat::Json)
        } else {
            println!("Deletion of {} started", full_name);
            println!("Operation: {}", operation_name);
            println!(
                "To wait for completion, run: vertexctl operation wait {}",
                operation_name
            );
            Ok(())
        };
    }

    let poll = poll_config(&context.poll, async_ops.wait_timeout);
    wait_for_operation(operation, &poll, &format!("Deleting {}", resource_id(full_name))).await?;
    if out.is_structured() {
        out.print(json!({ "name": full_name, "deleted": true }), OutputFormat::Json)
    } else {
        println!("{} {}", "Deleted".green(), full_name);
        Ok(())
    }
}

fn summary_row(index: &Index) -> Value {
    json!({
        "id": resource_id(&index.name),
        "display_name": index.display_name,
        "update_method": index.index_update_method,
        "vectors": index.index_stats.as_ref().and_then(|s| s.vectors_count),
        "deployed": index.deployed_indexes.len(),
    })
}
