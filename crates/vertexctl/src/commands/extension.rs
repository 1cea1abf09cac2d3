//! Extension registry commands

use crate::cli::ExtensionCommands;
use crate::commands::async_utils::{poll_config, wait_for_operation};
use crate::commands::index::finish_delete;
use crate::commands::{OutputOptions, read_input_file};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;
use colored::Colorize;
use serde_json::{Value, json};
use tracing::info;
use vertexctl_core::names::{qualify, resource_id};
use vertexctl_core::services::{Extension, ExtensionRegistryHandler};

/// Handle extension commands
pub async fn handle_extension_command(
    cmd: &ExtensionCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let parent = context.parent();
    let handler = ExtensionRegistryHandler::new(client);

    match cmd {
        ExtensionCommands::Import { file, async_ops } => {
            let extension: Extension = read_input_file(file)?;
            info!("Importing extension from {}", file);
            let operation = handler.import_extension(&parent, &extension).await?;

            if !async_ops.wait {
                let operation_name = operation.name().to_string();
                return if out.is_structured() {
                    out.print(json!({ "operation": operation_name }), OutputFormat::Json)
                } else {
                    println!("Import of '{}' started", extension.display_name);
                    println!("Operation: {}", operation_name);
                    println!(
                        "To wait for completion, run: vertexctl operation wait --beta {}",
                        operation_name
                    );
                    Ok(())
                };
            }

            let poll = poll_config(&context.poll, async_ops.wait_timeout);
            let imported = wait_for_operation(
                operation,
                &poll,
                &format!("Importing {}", extension.display_name),
            )
            .await?;
            if out.is_structured() || out.query.is_some() {
                out.print(imported, OutputFormat::Json)
            } else {
                println!("{} extension {}", "Imported".green(), imported.name);
                Ok(())
            }
        }

        ExtensionCommands::Get { name } => {
            let extension = handler
                .get_extension(&qualify(&parent, "extensions", name))
                .await?;
            out.print(extension, OutputFormat::Json)
        }

        ExtensionCommands::List { filter } => {
            let extensions = handler
                .list_extensions(&parent, filter.as_deref(), None)?
                .collect()
                .await?;

            if out.is_structured() || out.query.is_some() {
                out.print(extensions, OutputFormat::Json)
            } else if extensions.is_empty() {
                println!("No extensions in {}", parent);
                Ok(())
            } else {
                let rows: Vec<Value> = extensions.iter().map(summary_row).collect();
                out.print(rows, OutputFormat::Table)
            }
        }

        ExtensionCommands::Delete { name, async_ops } => {
            let full_name = qualify(&parent, "extensions", name);
            let operation = handler.delete_extension(&full_name).await?;
            finish_delete(operation, &context, &full_name, async_ops, out).await
        }
    }
}

fn summary_row(extension: &Extension) -> Value {
    json!({
        "id": resource_id(&extension.name),
        "display_name": extension.display_name,
        "manifest": extension.manifest.name,
        "operations": extension.extension_operations.len(),
        "created": extension.create_time,
    })
}
