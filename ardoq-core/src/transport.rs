//! The remote-service seam consumed by the synchronization layer.

use serde_json::Value;

use crate::error::TransportError;
use crate::types::{Component, EntityId, EntityKind, Fields, Workspace, WorkspaceId};

/// Query used by component lookups, both against the cache and remotely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentQuery {
    /// Name to look for. Substring match unless `exact` is set.
    pub name: Option<String>,
    /// `(field, value)` pair; takes precedence over `name` when present.
    pub field: Option<(String, Value)>,
    pub exact: bool,
}

impl ComponentQuery {
    pub fn by_name(name: impl Into<String>, exact: bool) -> Self {
        Self {
            name: Some(name.into()),
            field: None,
            exact,
        }
    }

    pub fn by_field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: None,
            field: Some((field.into(), value.into())),
            exact: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.field.is_none()
    }

    /// Whether `component` satisfies this query.
    ///
    /// Field equality wins over the name rule. Name matching is case-sensitive.
    pub fn matches(&self, component: &Component) -> bool {
        if let Some((field, value)) = &self.field {
            return field_value(component, field).as_ref() == Some(value);
        }
        match &self.name {
            Some(name) if self.exact => component.name == *name,
            Some(name) => component.name.contains(name.as_str()),
            None => false,
        }
    }
}

/// Read a named field from a component, including its modelled fields.
pub fn field_value(component: &Component, field: &str) -> Option<Value> {
    match field {
        "name" => Some(Value::String(component.name.clone())),
        "typeId" => Some(Value::String(component.type_id.0.clone())),
        "rootWorkspace" => Some(Value::String(component.root_workspace.0.clone())),
        "_id" => component.id.as_ref().map(|id| Value::String(id.0.clone())),
        "_version" => component.version.map(Value::from),
        other => component.attributes.get(other).cloned(),
    }
}

/// Blocking access to the remote workspace graph.
///
/// Implementations translate non-success responses into [`TransportError`].
/// Bodies travel as raw [`Fields`] so the wire format stays authoritative.
pub trait Transport {
    /// Fetch a workspace with all its components and references.
    fn fetch_workspace(&mut self, id: &WorkspaceId) -> Result<Workspace, TransportError>;

    /// Create an entity; the response carries the assigned `_id` and `_version`.
    fn create_entity(&mut self, kind: EntityKind, body: &Fields) -> Result<Fields, TransportError>;

    /// Replace an entity; the response carries the new `_version`.
    fn update_entity(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        body: &Fields,
    ) -> Result<Fields, TransportError>;

    fn delete_entity(&mut self, kind: EntityKind, id: &EntityId) -> Result<(), TransportError>;

    /// Remote component search, used when a workspace has not been cached.
    fn search_components(
        &mut self,
        workspace: &WorkspaceId,
        query: &ComponentQuery,
    ) -> Result<Vec<Component>, TransportError>;
}
