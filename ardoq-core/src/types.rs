//! Domain types for the remote workspace graph.
//!
//! Field names follow the remote service's wire format (`_id`, `_version`,
//! `typeId`, `rootWorkspace`). Keys the types do not model explicitly are kept
//! in a flattened attribute map so they survive a fetch/update round trip.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open-ended attribute bag, exactly as sent over the wire.
pub type Fields = Map<String, Value>;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(pub String);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for WorkspaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkspaceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier assigned by the remote service to a component or reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Component type within a workspace's model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub String);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Numeric reference type from the workspace model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceType(pub u32);

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for ReferenceType {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The two kinds of entity held by a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Component,
    Reference,
}

impl EntityKind {
    /// Path segment used by the remote API for this kind.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::Component => "component",
            EntityKind::Reference => "reference",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A typed node in the workspace graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    pub name: String,
    #[serde(rename = "typeId")]
    pub type_id: TypeId,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: WorkspaceId,
    #[serde(flatten)]
    pub attributes: Fields,
}

impl Component {
    /// A candidate with no identifier and no extra attributes.
    pub fn new(
        name: impl Into<String>,
        type_id: impl Into<TypeId>,
        root_workspace: impl Into<WorkspaceId>,
    ) -> Self {
        Self {
            id: None,
            version: None,
            name: name.into(),
            type_id: type_id.into(),
            root_workspace: root_workspace.into(),
            attributes: Fields::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A typed directed edge between two components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(rename = "type")]
    pub ref_type: ReferenceType,
    pub source: EntityId,
    pub target: EntityId,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: WorkspaceId,
    #[serde(flatten)]
    pub attributes: Fields,
}

impl Reference {
    pub fn new(
        ref_type: impl Into<ReferenceType>,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        root_workspace: impl Into<WorkspaceId>,
    ) -> Self {
        Self {
            id: None,
            version: None,
            ref_type: ref_type.into(),
            source: source.into(),
            target: target.into(),
            root_workspace: root_workspace.into(),
            attributes: Fields::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A fully materialized workspace graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(rename = "_id")]
    pub id: WorkspaceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(flatten)]
    pub attributes: Fields,
}

impl Workspace {
    pub fn new(id: impl Into<WorkspaceId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            components: vec![],
            references: vec![],
            attributes: Fields::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity trait
// ---------------------------------------------------------------------------

/// Shared surface of [`Component`] and [`Reference`].
///
/// Lets the cache and the diff engine treat both kinds uniformly: an entity
/// can be viewed as a flat [`Fields`] map, rebuilt from one, and located in
/// its owning workspace's collection.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// Wire keys carried by modelled fields rather than `attributes`.
    const MODELLED_KEYS: &'static [&'static str];

    fn id(&self) -> Option<&EntityId>;

    fn set_id(&mut self, id: EntityId);

    fn root_workspace(&self) -> &WorkspaceId;

    /// Short human-readable handle for logs and error messages.
    fn label(&self) -> String;

    /// Free-form attributes flattened into the wire representation.
    fn attributes(&self) -> &Fields;

    /// Attribute keys that would override a modelled field on the wire.
    fn shadowing_attributes(&self) -> Vec<&str> {
        self.attributes()
            .keys()
            .map(String::as_str)
            .filter(|key| Self::MODELLED_KEYS.iter().any(|modelled| modelled == key))
            .collect()
    }

    /// The workspace sequence holding entities of this kind.
    fn collection(workspace: &Workspace) -> &Vec<Self>;

    fn collection_mut(workspace: &mut Workspace) -> &mut Vec<Self>;

    /// Flatten into the wire representation.
    fn to_fields(&self) -> Result<Fields, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "{} did not serialize to an object: {other}",
                Self::KIND
            ))),
        }
    }

    /// Rebuild from the wire representation.
    fn from_fields(fields: Fields) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }
}

impl Entity for Component {
    const KIND: EntityKind = EntityKind::Component;
    const MODELLED_KEYS: &'static [&'static str] =
        &["_id", "_version", "name", "typeId", "rootWorkspace"];

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn root_workspace(&self) -> &WorkspaceId {
        &self.root_workspace
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn attributes(&self) -> &Fields {
        &self.attributes
    }

    fn collection(workspace: &Workspace) -> &Vec<Self> {
        &workspace.components
    }

    fn collection_mut(workspace: &mut Workspace) -> &mut Vec<Self> {
        &mut workspace.components
    }
}

impl Entity for Reference {
    const KIND: EntityKind = EntityKind::Reference;
    const MODELLED_KEYS: &'static [&'static str] =
        &["_id", "_version", "type", "source", "target", "rootWorkspace"];

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn root_workspace(&self) -> &WorkspaceId {
        &self.root_workspace
    }

    fn label(&self) -> String {
        format!("{} -[{}]-> {}", self.source, self.ref_type, self.target)
    }

    fn attributes(&self) -> &Fields {
        &self.attributes
    }

    fn collection(workspace: &Workspace) -> &Vec<Self> {
        &workspace.references
    }

    fn collection_mut(workspace: &mut Workspace) -> &mut Vec<Self> {
        &mut workspace.references
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
