//! Core types for txpolicy
//!
//! This crate defines the data the transaction interceptor decides on:
//! - Policy: NOT_REQUIRED / REQUIRED / NESTED
//! - KindRegistry: error kind hierarchy used by no-rollback lists
//! - PolicyDescriptor: validated method- or class-level metadata
//! - TransactionConfig: global defaults loaded from `transaction.toml`
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod kind;
pub mod policy;

pub use config::{TransactionConfig, CONFIG_FILE_NAME};
pub use descriptor::{PolicyDescriptor, PolicyOptions};
pub use error::{CoreError, CoreResult, ResourceError, ResourceOp, ResourceResult};
pub use kind::{Classified, KindRegistry, RESOURCE_ERROR_KIND, ROOT_ERROR_KIND};
pub use policy::Policy;
