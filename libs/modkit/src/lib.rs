//! # ModKit - module contracts and runtime
//!
//! Building blocks for a modular HTTP service:
//!
//! - **Contracts**: `DbModule`, `RestfulModule`, `RestHostModule`, `StatefulModule`
//! - **Registry**: modules are registered explicitly by the composition root
//! - **Runtime**: ordered phases DB → REST → start → wait → stop
//! - **API**: type-safe `OperationBuilder`, RFC 9457 problems, `ValidatedJson`
//!
//! ## Example
//!
//! ```rust,ignore
//! let registry = ModuleRegistry::builder()
//!     .register_rest_host("api_ingress", ingress.clone())
//!     .register_stateful("api_ingress", ingress)
//!     .register_db("users", users.clone())
//!     .register_rest("users", users)
//!     .build()?;
//! modkit::run(RunOptions { registry, db, shutdown: ShutdownOptions::Signals }).await?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

// Core module contracts and traits
pub mod contracts;
pub use crate::contracts::*;

pub mod registry;
pub use registry::{ModuleRegistry, RegistryError};

pub mod api;
pub use api::problem::{
    bad_request, internal_error, not_found, Problem, ProblemResponse, ValidationError,
};
pub use api::{OpenApiRegistry, OperationBuilder, ValidatedJson};

pub mod runtime;
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};
