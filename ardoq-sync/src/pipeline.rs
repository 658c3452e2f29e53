//! Shared sync pipeline entrypoint: apply a [`Manifest`] through an
//! [`Orchestrator`].

use std::collections::HashMap;

use ardoq_core::{Component, Entity, EntityId, EntityKind, Reference, Transport};

use crate::manifest::Manifest;
use crate::report::Report;
use crate::upsert::{Orchestrator, Upserted};
use crate::SyncError;

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub components: Vec<Upserted<Component>>,
    pub references: Vec<Upserted<Reference>>,
    pub report: Report,
}

impl PipelineResult {
    pub fn has_changes(&self) -> bool {
        self.report.has_changes()
    }
}

/// Apply `manifest`: components first, in order, then references.
///
/// The report is reset before the first upsert, so the returned snapshot
/// covers exactly this run. The first failing upsert aborts the run; what
/// was applied before it stays applied.
pub fn run<T: Transport>(
    orchestrator: &mut Orchestrator<T>,
    manifest: &Manifest,
) -> Result<PipelineResult, SyncError> {
    orchestrator.reset_report();
    let match_field = manifest.match_field.as_deref();

    let mut keys: HashMap<&str, EntityId> = HashMap::new();
    let mut components = Vec::with_capacity(manifest.components.len());
    for entry in &manifest.components {
        let upserted =
            orchestrator.upsert_component(entry.to_candidate(&manifest.workspace), match_field)?;
        if let Some(key) = entry.key.as_deref() {
            let id = upserted.entity.id().cloned().ok_or_else(|| SyncError::MissingId {
                kind: EntityKind::Component,
                label: upserted.entity.label(),
            })?;
            keys.insert(key, id);
        }
        components.push(upserted);
    }

    let resolve = |endpoint: &str| {
        keys.get(endpoint)
            .cloned()
            .unwrap_or_else(|| EntityId::from(endpoint))
    };

    let mut references = Vec::with_capacity(manifest.references.len());
    for entry in &manifest.references {
        let candidate = entry.to_candidate(
            &manifest.workspace,
            resolve(&entry.source),
            resolve(&entry.target),
        );
        references.push(orchestrator.upsert_reference(candidate)?);
    }

    let report = orchestrator.report();
    tracing::debug!(
        components = components.len(),
        references = references.len(),
        simulate = report.simulate,
        "pipeline finished"
    );
    Ok(PipelineResult {
        components,
        references,
        report,
    })
}
