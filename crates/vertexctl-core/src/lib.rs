//! # vertexctl-core
//!
//! Typed client for the Vertex AI platform REST surface.
//!
//! The crate is organised in layers:
//!
//! - [`client`] - authenticated HTTP transport with regional endpoints
//! - [`lro`] - long-running operation handles and polling
//! - [`pagination`] - lazy [`Pager`] over list/search responses
//! - [`services`] - per-service request handlers
//! - [`ray`] - Ray cluster lifecycle on top of persistent resources
//! - [`agent`] - the AG2 agent adapter and its default runnable
//! - [`config`] - profile storage for the CLI
//!
//! Nothing reads process-wide state: pass a [`PlatformContext`] (project,
//! location, credentials) to whatever needs one.
//!
//! ```rust,ignore
//! use vertexctl_core::PlatformContext;
//! use vertexctl_core::services::{IndexHandler, ListIndexesParams};
//!
//! let context = PlatformContext::from_env()?;
//! let indexes = IndexHandler::new(context.client()?);
//! let all = indexes
//!     .list_indexes(&ListIndexesParams::new(context.parent()))?
//!     .collect()
//!     .await?;
//! ```
//!
//! Synchronous callers wrap the same calls in a [`BlockingClient`].

pub mod agent;
pub mod blocking;
pub mod client;
pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod lro;
pub mod names;
pub mod pagination;
pub mod ray;
pub mod services;
pub mod wire;

pub use blocking::BlockingClient;
pub use client::{AiPlatformClient, ApiVersion};
pub use context::PlatformContext;
pub use error::{CoreError, Result};
pub use lro::{
    Operation, OperationHandle, OperationsHandler, PollConfig, ProgressCallback, ProgressEvent,
};
pub use pagination::Pager;
