//! Spinner-backed waiting for long-running operations
//!
//! Wraps the library's operation polling with an `indicatif` spinner driven
//! by the progress callback.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use vertexctl_core::{OperationHandle, PollConfig, ProgressCallback, ProgressEvent};

use crate::error::Result as CliResult;

/// Profile cadence with an optional command-line timeout on top
pub fn poll_config(base: &PollConfig, timeout_secs: Option<u64>) -> PollConfig {
    match timeout_secs {
        Some(secs) => base.clone().with_timeout(Duration::from_secs(secs)),
        None => base.clone(),
    }
}

/// Spinner plus a progress callback that keeps it current
pub fn progress_spinner(message: &str) -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event: ProgressEvent| match &event {
        ProgressEvent::Started { name } => {
            pb_clone.set_message(format!("Waiting for {}", short_name(name)));
        }
        ProgressEvent::Polling { name, elapsed, .. } => {
            pb_clone.set_message(format!(
                "Waiting for {}: {}s elapsed",
                short_name(name),
                elapsed.as_secs()
            ));
        }
        ProgressEvent::Completed { name } => {
            pb_clone.set_message(format!("{} completed", short_name(name)));
        }
        ProgressEvent::Failed { name, error } => {
            pb_clone.set_message(format!("{} failed: {}", short_name(name), error));
        }
    });

    (pb, callback)
}

/// Wait for an operation with a spinner, clearing it whatever the outcome
pub async fn wait_for_operation<T: DeserializeOwned>(
    handle: OperationHandle<T>,
    poll: &PollConfig,
    message: &str,
) -> CliResult<T> {
    let (pb, callback) = progress_spinner(message);
    let result = handle.wait_with(poll, Some(callback)).await;
    pb.finish_and_clear();
    Ok(result?)
}

/// Last two segments of an operation name, e.g. `operations/123`
fn short_name(name: &str) -> &str {
    match name.match_indices('/').nth_back(1) {
        Some((idx, _)) => &name[idx + 1..],
        None => name,
    }
}
