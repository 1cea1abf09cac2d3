//! Long-running operation handles and polling
//!
//! Mutating calls (create, import, update, delete) answer with a
//! `google.longrunning.Operation` instead of the final resource. This module
//! wraps that reply in an [`OperationHandle`] which re-reads the operation
//! until it reports `done`, then unwraps the response into the expected type
//! or surfaces the remote error status.

use crate::client::{AiPlatformClient, ApiVersion};
use crate::error::{CoreError, Result};
use crate::wire::Empty;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Polling cadence for operations
///
/// Defaults match the operation-polling library the platform's own SDKs use:
/// first re-check after one second, growing by half each time up to twenty
/// seconds, and no overall deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Give up after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 1.5,
            max_delay: Duration::from_secs(20),
            timeout: None,
        }
    }
}

impl PollConfig {
    /// Poll at a fixed interval
    #[must_use]
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_delay: interval,
            multiplier: 1.0,
            max_delay: interval,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier.max(1.0)).min(self.max_delay)
    }
}

/// Progress events emitted while an operation is polled
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling has started
    Started { name: String },
    /// The operation was re-read and is still running
    Polling {
        name: String,
        elapsed: Duration,
        metadata: Option<Value>,
    },
    /// The operation finished successfully
    Completed { name: String },
    /// The operation finished with an error
    Failed { name: String, error: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// `google.rpc.Status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

/// `google.longrunning.Operation`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl Operation {
    /// Unwrap a finished operation into its response type
    ///
    /// Operations that finish without a response body (deletes) decode from
    /// an empty object.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if let Some(status) = self.error {
            return Err(CoreError::OperationFailed {
                name: self.name,
                code: status.code,
                message: status.message,
                details: status.details,
            });
        }
        let response = self
            .response
            .unwrap_or_else(|| Value::Object(Default::default()));
        Ok(serde_json::from_value(response)?)
    }
}

/// Canonical name of a `google.rpc.Code`
pub fn code_name(code: i32) -> &'static str {
    match code {
        0 => "OK",
        1 => "CANCELLED",
        2 => "UNKNOWN",
        3 => "INVALID_ARGUMENT",
        4 => "DEADLINE_EXCEEDED",
        5 => "NOT_FOUND",
        6 => "ALREADY_EXISTS",
        7 => "PERMISSION_DENIED",
        8 => "RESOURCE_EXHAUSTED",
        9 => "FAILED_PRECONDITION",
        10 => "ABORTED",
        11 => "OUT_OF_RANGE",
        12 => "UNIMPLEMENTED",
        13 => "INTERNAL",
        14 => "UNAVAILABLE",
        15 => "DATA_LOSS",
        16 => "UNAUTHENTICATED",
        _ => "UNKNOWN",
    }
}

/// Poll an operation by name until it reports `done`
///
/// # Arguments
///
/// * `client` - The API client
/// * `version` - API surface the operation lives on
/// * `name` - Full operation resource name
/// * `config` - Delay schedule and optional timeout
/// * `on_progress` - Optional callback for progress updates
///
/// # Returns
///
/// The finished operation, or an error if it failed or timed out.
///
/// # Example
///
/// ```rust,ignore
/// use vertexctl_core::lro::{poll_operation, PollConfig, ProgressEvent};
///
/// let op = poll_operation(
///     &client,
///     ApiVersion::V1,
///     "projects/p/locations/us-central1/operations/123",
///     &PollConfig::default(),
///     Some(Box::new(|event| {
///         if let ProgressEvent::Polling { elapsed, .. } = event {
///             println!("still running ({:.0}s)", elapsed.as_secs());
///         }
///     })),
/// )
/// .await?;
/// ```
pub async fn poll_operation(
    client: &AiPlatformClient,
    version: ApiVersion,
    name: &str,
    config: &PollConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<Operation> {
    let start = Instant::now();
    let mut delay = config.initial_delay;

    emit(
        &on_progress,
        ProgressEvent::Started {
            name: name.to_string(),
        },
    );

    loop {
        let operation: Operation = client.get(version, name, &[]).await?;

        if operation.done {
            return Ok(finish(operation, name, &on_progress));
        }

        // The read above is the last one once the deadline has passed
        let elapsed = start.elapsed();
        let sleep_for = match config.timeout {
            Some(timeout) if elapsed >= timeout => {
                return Err(CoreError::OperationTimeout(timeout));
            }
            Some(timeout) => delay.min(timeout - elapsed),
            None => delay,
        };

        emit(
            &on_progress,
            ProgressEvent::Polling {
                name: name.to_string(),
                elapsed,
                metadata: operation.metadata.clone(),
            },
        );

        debug!("Operation {} still running, next check in {:?}", name, sleep_for);
        tokio::time::sleep(sleep_for).await;
        delay = config.next_delay(delay);
    }
}

fn finish(operation: Operation, name: &str, on_progress: &Option<ProgressCallback>) -> Operation {
    match &operation.error {
        Some(status) => {
            info!("Operation {} failed: {}", name, status.message);
            emit(
                on_progress,
                ProgressEvent::Failed {
                    name: name.to_string(),
                    error: format!("{}: {}", code_name(status.code), status.message),
                },
            );
        }
        None => {
            info!("Operation {} completed", name);
            emit(
                on_progress,
                ProgressEvent::Completed {
                    name: name.to_string(),
                },
            );
        }
    }
    operation
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

/// Pending result of a mutating call
///
/// `T` is the type the operation's response unwraps to.
#[derive(Debug)]
pub struct OperationHandle<T> {
    client: AiPlatformClient,
    version: ApiVersion,
    operation: Operation,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> OperationHandle<T> {
    pub(crate) fn new(client: AiPlatformClient, version: ApiVersion, operation: Operation) -> Self {
        debug!("Started operation {}", operation.name);
        Self {
            client,
            version,
            operation,
            _marker: PhantomData,
        }
    }

    /// Operation resource name
    pub fn name(&self) -> &str {
        &self.operation.name
    }

    /// Last observed state of the operation
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.operation.metadata.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.operation.done
    }

    /// Re-read the operation once
    pub async fn refresh(&mut self) -> Result<&Operation> {
        self.operation = self
            .client
            .get(self.version, &self.operation.name, &[])
            .await?;
        Ok(&self.operation)
    }

    /// Ask the service to cancel the operation
    ///
    /// Cancellation is best effort; the operation still has to be polled to
    /// learn its final state.
    pub async fn cancel(&self) -> Result<()> {
        let _: Empty = self
            .client
            .post(
                self.version,
                &format!("{}:cancel", self.operation.name),
                &[],
                &Empty {},
            )
            .await?;
        Ok(())
    }

    /// Wait with the default poll schedule and no timeout
    pub async fn wait(self) -> Result<T> {
        self.wait_with(&PollConfig::default(), None).await
    }

    /// Wait until the operation finishes and unwrap its response
    pub async fn wait_with(
        self,
        config: &PollConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Result<T> {
        let operation = if self.operation.done {
            let name = self.operation.name.clone();
            finish(self.operation, &name, &on_progress)
        } else {
            if self.operation.name.is_empty() {
                return Err(CoreError::Validation(
                    "operation reply carried no name and cannot be polled".to_string(),
                ));
            }
            poll_operation(
                &self.client,
                self.version,
                &self.operation.name,
                config,
                on_progress,
            )
            .await?
        };
        operation.into_result()
    }
}

/// Direct access to operations by name
#[derive(Debug, Clone)]
pub struct OperationsHandler {
    client: AiPlatformClient,
}

impl OperationsHandler {
    pub fn new(client: AiPlatformClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, version: ApiVersion, name: &str) -> Result<Operation> {
        if name.trim().is_empty() {
            return Err(CoreError::missing("name"));
        }
        self.client.get(version, name, &[]).await
    }

    pub async fn cancel(&self, version: ApiVersion, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CoreError::missing("name"));
        }
        let _: Empty = self
            .client
            .post(version, &format!("{name}:cancel"), &[], &Empty {})
            .await?;
        Ok(())
    }

    /// Resume waiting on an operation started elsewhere
    pub fn resume<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        name: impl Into<String>,
    ) -> OperationHandle<T> {
        OperationHandle::new(
            self.client.clone(),
            version,
            Operation {
                name: name.into(),
                ..Default::default()
            },
        )
    }
}
