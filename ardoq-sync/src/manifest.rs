//! Declarative desired-state document.
//!
//! ```yaml
//! workspace: 5a1b...
//! match_field: code
//! components:
//!   - key: api
//!     name: Billing API
//!     typeId: p1458752640732
//!     code: BILL-1
//! references:
//!   - type: 2
//!     source: api
//!     target: 5a1bc0ffee
//!     description: reads invoices
//! ```

use std::path::Path;

use serde::Deserialize;

use ardoq_core::{Component, EntityId, Fields, Reference, ReferenceType, TypeId, WorkspaceId};

use crate::error::{io_err, SyncError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub workspace: WorkspaceId,
    #[serde(default)]
    pub match_field: Option<String>,
    #[serde(default)]
    pub components: Vec<ManifestComponent>,
    #[serde(default)]
    pub references: Vec<ManifestReference>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestComponent {
    /// Local handle references can use instead of a remote id.
    #[serde(default)]
    pub key: Option<String>,
    pub name: String,
    #[serde(rename = "typeId")]
    pub type_id: TypeId,
    #[serde(flatten)]
    pub attributes: Fields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestReference {
    #[serde(rename = "type")]
    pub ref_type: ReferenceType,
    /// Component key or literal component id.
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub attributes: Fields,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let raw = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&raw).map_err(|source| SyncError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}

impl ManifestComponent {
    /// The upsert candidate for this entry, owned by `workspace`.
    pub fn to_candidate(&self, workspace: &WorkspaceId) -> Component {
        Component {
            id: None,
            version: None,
            name: self.name.clone(),
            type_id: self.type_id.clone(),
            root_workspace: workspace.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl ManifestReference {
    /// The upsert candidate for this entry with its endpoints already resolved.
    pub fn to_candidate(
        &self,
        workspace: &WorkspaceId,
        source: EntityId,
        target: EntityId,
    ) -> Reference {
        Reference {
            id: None,
            version: None,
            ref_type: self.ref_type,
            source,
            target,
            root_workspace: workspace.clone(),
            attributes: self.attributes.clone(),
        }
    }
}
