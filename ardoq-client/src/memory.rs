//! In-process stand-in for the remote service.
//!
//! Behaves like the real API for the operations the sync layer uses:
//! assigns `_id` and `_version` on create, bumps `_version` on update and
//! enforces it when the body carries one, and reports unknown workspaces and
//! entities as [`TransportError::NotFound`]. Every call is recorded.

use std::collections::BTreeMap;

use serde_json::Value;

use ardoq_core::{
    transport::ComponentQuery, Component, EntityId, EntityKind, Fields, Transport,
    TransportError, Workspace, WorkspaceId,
};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(WorkspaceId),
    Create(EntityKind),
    Update(EntityKind, EntityId),
    Delete(EntityKind, EntityId),
    Search(WorkspaceId),
}

impl Call {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Create(_) | Call::Update(..) | Call::Delete(..))
    }
}

/// In-memory remote holding whole workspaces keyed by id.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    calls: Vec<Call>,
    next_id: u64,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a workspace as if it already existed remotely.
    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.insert_workspace(workspace);
        self
    }

    pub fn insert_workspace(&mut self, workspace: Workspace) {
        self.workspaces.insert(workspace.id.clone(), workspace);
    }

    /// Remote state of a workspace, bypassing the call log.
    pub fn workspace(&self, id: &WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(id)
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.iter().filter(|c| c.is_mutation()).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn owning_workspace(&mut self, body: &Fields) -> Result<&mut Workspace, TransportError> {
        let id = body
            .get("rootWorkspace")
            .and_then(Value::as_str)
            .ok_or_else(|| TransportError::BadRequest("rootWorkspace is required".into()))?;
        self.workspaces
            .get_mut(&WorkspaceId::from(id))
            .ok_or_else(|| TransportError::NotFound(format!("workspace {id}")))
    }

    fn allocate_id(&mut self, kind: EntityKind) -> EntityId {
        self.next_id += 1;
        EntityId(format!("{kind}-{}", self.next_id))
    }
}

impl Transport for MemoryTransport {
    fn fetch_workspace(&mut self, id: &WorkspaceId) -> Result<Workspace, TransportError> {
        self.calls.push(Call::Fetch(id.clone()));
        self.workspaces
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("workspace {id}")))
    }

    fn create_entity(&mut self, kind: EntityKind, body: &Fields) -> Result<Fields, TransportError> {
        self.calls.push(Call::Create(kind));
        let id = self.allocate_id(kind);
        let mut stored = body.clone();
        stored.insert("_id".into(), Value::String(id.0));
        stored.insert("_version".into(), Value::from(1u64));

        let workspace = self.owning_workspace(body)?;
        let value = Value::Object(stored.clone());
        match kind {
            EntityKind::Component => workspace.components.push(serde_json::from_value(value)?),
            EntityKind::Reference => workspace.references.push(serde_json::from_value(value)?),
        }
        Ok(stored)
    }

    fn update_entity(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        body: &Fields,
    ) -> Result<Fields, TransportError> {
        self.calls.push(Call::Update(kind, id.clone()));
        let workspace = self.owning_workspace(body)?;
        let current = match kind {
            EntityKind::Component => workspace
                .components
                .iter()
                .find(|c| c.id.as_ref() == Some(id))
                .map(|c| c.version),
            EntityKind::Reference => workspace
                .references
                .iter()
                .find(|r| r.id.as_ref() == Some(id))
                .map(|r| r.version),
        }
        .ok_or_else(|| TransportError::NotFound(format!("{kind} {id}")))?;

        let sent = body.get("_version").and_then(Value::as_u64);
        if let (Some(sent), Some(current)) = (sent, current) {
            if sent != current {
                return Err(TransportError::VersionConflict(format!(
                    "{kind} {id}: sent version {sent}, current is {current}"
                )));
            }
        }

        let mut stored = body.clone();
        stored.insert("_id".into(), Value::String(id.0.clone()));
        stored.insert("_version".into(), Value::from(current.unwrap_or(0) + 1));
        let value = Value::Object(stored.clone());
        match kind {
            EntityKind::Component => {
                let updated = serde_json::from_value(value)?;
                let slot = workspace.components.iter_mut().find(|c| c.id.as_ref() == Some(id));
                if let Some(slot) = slot {
                    *slot = updated;
                }
            }
            EntityKind::Reference => {
                let updated = serde_json::from_value(value)?;
                let slot = workspace.references.iter_mut().find(|r| r.id.as_ref() == Some(id));
                if let Some(slot) = slot {
                    *slot = updated;
                }
            }
        }
        Ok(stored)
    }

    fn delete_entity(&mut self, kind: EntityKind, id: &EntityId) -> Result<(), TransportError> {
        self.calls.push(Call::Delete(kind, id.clone()));
        for workspace in self.workspaces.values_mut() {
            let before = workspace.components.len() + workspace.references.len();
            match kind {
                EntityKind::Component => {
                    workspace.components.retain(|c| c.id.as_ref() != Some(id))
                }
                EntityKind::Reference => {
                    workspace.references.retain(|r| r.id.as_ref() != Some(id))
                }
            }
            if workspace.components.len() + workspace.references.len() < before {
                return Ok(());
            }
        }
        Err(TransportError::NotFound(format!("{kind} {id}")))
    }

    fn search_components(
        &mut self,
        workspace: &WorkspaceId,
        query: &ComponentQuery,
    ) -> Result<Vec<Component>, TransportError> {
        self.calls.push(Call::Search(workspace.clone()));
        let ws = self
            .workspaces
            .get(workspace)
            .ok_or_else(|| TransportError::NotFound(format!("workspace {workspace}")))?;
        Ok(ws
            .components
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }
}
