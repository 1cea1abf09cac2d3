//! Profile configuration for vertexctl
//!
//! Profiles live in a TOML file under the platform config directory. Each
//! profile names a project, a location, and optionally an access token,
//! endpoint override, quota project and polling cadence.
//!
//! Token values may be plaintext, `${ENV}` references (expanded on load), or
//! `keyring:` references resolved through the OS keyring when the
//! `secure-storage` feature is enabled.

#![allow(clippy::module_inception)]

pub mod config;
pub mod credential;
pub mod error;

pub use config::{Config, PollingConfig, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
