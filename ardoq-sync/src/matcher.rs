//! Matcher: locate the existing entity a candidate corresponds to.
//!
//! Scans are stable (cache insertion order) and the first satisfying entity
//! wins. "Not found" is `None`, never index 0 with an empty body.

use ardoq_core::transport::{field_value, ComponentQuery};
use ardoq_core::{Component, EntityKind, Reference, Workspace};

use crate::error::{malformed, SyncError};

/// A match: position in the workspace sequence plus the entity found there.
pub type Found<'a, E> = Option<(usize, &'a E)>;

/// Find the component `candidate` corresponds to.
///
/// Default rule: case-insensitive `name` and exact `typeId`. With
/// `match_field`, the rule becomes exact equality of that field and `typeId`;
/// the name is not consulted at all.
///
/// Fails with [`SyncError::MalformedCandidate`] when `match_field` names a
/// field the candidate does not carry.
pub fn find_component<'a>(
    workspace: &'a Workspace,
    candidate: &Component,
    match_field: Option<&str>,
) -> Result<Found<'a, Component>, SyncError> {
    let found = match match_field {
        Some(field) => {
            let wanted = field_value(candidate, field).ok_or_else(|| {
                malformed(
                    EntityKind::Component,
                    format!("match field '{field}' missing from '{}'", candidate.name),
                )
            })?;
            workspace.components.iter().enumerate().find(|(_, c)| {
                c.type_id == candidate.type_id && field_value(c, field).as_ref() == Some(&wanted)
            })
        }
        None => {
            let name = candidate.name.to_lowercase();
            workspace
                .components
                .iter()
                .enumerate()
                .find(|(_, c)| c.type_id == candidate.type_id && c.name.to_lowercase() == name)
        }
    };
    Ok(found)
}

/// Find the reference with the same `(type, source, target)` triple.
pub fn find_reference<'a>(workspace: &'a Workspace, candidate: &Reference) -> Found<'a, Reference> {
    workspace.references.iter().enumerate().find(|(_, r)| {
        r.ref_type == candidate.ref_type
            && r.source == candidate.source
            && r.target == candidate.target
    })
}

/// All cached components satisfying `query`, in cache order.
pub fn search_components(workspace: &Workspace, query: &ComponentQuery) -> Vec<Component> {
    workspace
        .components
        .iter()
        .filter(|c| query.matches(c))
        .cloned()
        .collect()
}
