//! Ardoq core library: workspace graph types, the transport seam, errors,
//! and client configuration.
//!
//! - [`types`]: newtypes, [`Workspace`], [`Component`], [`Reference`], [`Entity`]
//! - [`transport`]: the [`Transport`] trait and [`ComponentQuery`]
//! - [`error`]: [`TransportError`], [`ConfigError`]
//! - [`config`]: load / resolve `~/.ardoq/config.yaml`

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, TransportError};
pub use transport::{ComponentQuery, Transport};
pub use types::{
    Component, Entity, EntityId, EntityKind, Fields, Reference, ReferenceType, TypeId,
    Workspace, WorkspaceId,
};
