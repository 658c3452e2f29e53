//! Workspace cache store.
//!
//! An unbounded, process-lifetime map from workspace id to the full
//! materialized graph. The store never decides when to fetch; callers hand
//! it a transport through [`WorkspaceCache::ensure_loaded`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ardoq_core::{Entity, EntityId, Transport, TransportError, Workspace, WorkspaceId};

use crate::SyncError;

#[derive(Debug, Default)]
pub struct WorkspaceCache {
    workspaces: HashMap<WorkspaceId, Workspace>,
}

impl WorkspaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// Return the cached workspace, fetching it through `transport` on first use.
    ///
    /// A graph whose identifier differs from `id` is rejected and not cached.
    pub fn ensure_loaded<T: Transport>(
        &mut self,
        transport: &mut T,
        id: &WorkspaceId,
    ) -> Result<&mut Workspace, SyncError> {
        let slot = match self.workspaces.entry(id.clone()) {
            Entry::Occupied(cached) => return Ok(cached.into_mut()),
            Entry::Vacant(slot) => slot,
        };
        let workspace = transport.fetch_workspace(id)?;
        if workspace.id != *id {
            return Err(TransportError::NotFound(format!(
                "workspace {id}: service answered with workspace {}",
                workspace.id
            ))
            .into());
        }
        tracing::debug!(
            workspace = %workspace.id,
            components = workspace.components.len(),
            references = workspace.references.len(),
            "workspace cached"
        );
        Ok(slot.insert(workspace))
    }

    /// Seed or replace a workspace without going through a transport.
    pub fn insert(&mut self, workspace: Workspace) {
        self.workspaces.insert(workspace.id.clone(), workspace);
    }

    /// Overwrite the entity at `index` in the workspace's sequence for `E`.
    ///
    /// Returns `false` when the workspace is not cached or `index` is out of range.
    pub fn replace_entity<E: Entity>(
        &mut self,
        workspace: &WorkspaceId,
        index: usize,
        entity: E,
    ) -> bool {
        let Some(slot) = self
            .workspaces
            .get_mut(workspace)
            .and_then(|ws| E::collection_mut(ws).get_mut(index))
        else {
            return false;
        };
        *slot = entity;
        true
    }

    /// Append to the workspace's sequence for `E`.
    ///
    /// Returns `false` when the workspace is not cached.
    pub fn append_entity<E: Entity>(&mut self, workspace: &WorkspaceId, entity: E) -> bool {
        match self.workspaces.get_mut(workspace) {
            Some(ws) => {
                E::collection_mut(ws).push(entity);
                true
            }
            None => false,
        }
    }

    /// Drop the entity with identifier `id` from every cached workspace.
    ///
    /// Returns how many entries were removed.
    pub fn remove_entity<E: Entity>(&mut self, id: &EntityId) -> usize {
        let mut removed = 0;
        for ws in self.workspaces.values_mut() {
            let entities = E::collection_mut(ws);
            let before = entities.len();
            entities.retain(|e| e.id() != Some(id));
            removed += before - entities.len();
        }
        removed
    }
}
