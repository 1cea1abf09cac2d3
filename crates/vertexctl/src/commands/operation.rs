//! Long-running operation commands

use crate::cli::OperationCommands;
use crate::commands::OutputOptions;
use crate::commands::async_utils::{poll_config, wait_for_operation};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::OutputFormat;
use serde_json::{Value, json};
use vertexctl_core::{ApiVersion, OperationsHandler};

fn api_version(beta: bool) -> ApiVersion {
    if beta {
        ApiVersion::V1Beta1
    } else {
        ApiVersion::V1
    }
}

/// Handle operation commands
pub async fn handle_operation_command(
    cmd: &OperationCommands,
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    out: OutputOptions<'_>,
) -> CliResult<()> {
    let (context, client) = conn_mgr.create_client(profile)?;
    let handler = OperationsHandler::new(client);

    match cmd {
        OperationCommands::Get { name, beta } => {
            let operation = handler.get(api_version(*beta), name).await?;
            out.print(operation, OutputFormat::Json)
        }

        OperationCommands::Wait {
            name,
            timeout,
            beta,
        } => {
            let handle = handler.resume::<Value>(api_version(*beta), name.clone());
            let poll = poll_config(&context.poll, *timeout);
            let response = wait_for_operation(handle, &poll, &format!("Waiting for {}", name)).await?;
            out.print(json!({ "name": name, "done": true, "response": response }), OutputFormat::Json)
        }

        OperationCommands::Cancel { name, beta } => {
            handler.cancel(api_version(*beta), name).await?;
            if out.is_structured() {
                out.print(json!({ "name": name, "cancel_requested": true }), OutputFormat::Json)
            } else {
                println!("Cancellation requested for {}", name);
                Ok(())
            }
        }
    }
}
