//! # berth-compose
//!
//! Resolution engine for compose documents.
//!
//! Handles:
//! - **Document**: Decoding bytes and dispatching on the schema version.
//! - **Interpolation**: `$VAR` / `${VAR}` substitution from an injected environment.
//! - **Extends**: Inheriting options from base services, locally or across files.
//! - **Merge**: Per-key override of one service record by another.
//! - **Schema**: Validation and coercion into typed service, volume and network configs.
//! - **Resolve**: One document in, typed configs out, layered over earlier results.
//! - **Project**: Applying several compose files in order.

pub mod document;
pub mod error;
pub mod extends;
pub mod interpolation;
pub mod lookup;
pub mod merge;
pub mod project;
pub mod resolve;
pub mod schema;
pub mod value;

pub use error::{ComposeError, Result};
pub use interpolation::Warning;
pub use lookup::{EnvironmentLookup, FileResourceLookup, MapEnvironment, OsEnvironment, ResourceLookup};
pub use project::{Project, ProjectModel};
pub use resolve::{Configs, Resolved, resolve};
pub use schema::resource::{NetworkConfig, VolumeConfig};
pub use schema::service::ServiceConfig;
