pub mod config;
pub mod delete;
pub mod diff;
pub mod find;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use ardoq_client::HttpTransport;
use ardoq_core::config::resolve;
use ardoq_sync::{Manifest, Orchestrator};

/// Resolve `~/.ardoq/config.yaml` plus environment and open a session.
pub(crate) fn connect(simulate: bool) -> Result<Orchestrator<HttpTransport>> {
    let config = resolve().context("invalid ardoq configuration")?;
    let transport = HttpTransport::new(&config);
    tracing::debug!(base_url = transport.base_url(), simulate, "connecting");
    Ok(Orchestrator::new(transport, simulate))
}

pub(crate) fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::load(path).with_context(|| format!("failed to load manifest '{}'", path.display()))
}
