//! Change reporter: session-wide counters of what the orchestrator did.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ardoq_core::{EntityId, EntityKind, TypeId};

/// Summary of a component created (or, when simulating, that would be).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComponent {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "typeId")]
    pub type_id: TypeId,
}

/// One orchestrator outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A reference (or an entity of any kind without a summary) was created.
    Created(EntityKind),
    /// A component was created; its summary joins the new-components list.
    ComponentCreated(NewComponent),
    Updated(EntityKind),
    Deleted(EntityKind),
    CacheHit(EntityKind),
}

/// Counters for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub new: u64,
    pub updated: u64,
    pub deleted: u64,
    pub cache_hit: u64,
}

impl Counts {
    /// Total number of remote mutations these counters stand for.
    pub fn changes(&self) -> u64 {
        self.new + self.updated + self.deleted
    }
}

/// Snapshot of a sync session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub simulate: bool,
    pub components: Counts,
    pub references: Counts,
    pub new_components: Vec<NewComponent>,
}

impl Report {
    /// Whether the session changed (or would change) anything remotely.
    pub fn has_changes(&self) -> bool {
        self.components.changes() + self.references.changes() > 0
    }
}

#[derive(Debug)]
pub struct ChangeReporter {
    report: Report,
}

impl ChangeReporter {
    pub fn new(simulate: bool) -> Self {
        Self {
            report: Report {
                started_at: Utc::now(),
                simulate,
                components: Counts::default(),
                references: Counts::default(),
                new_components: Vec::new(),
            },
        }
    }

    pub fn record(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Created(kind) => self.counts_mut(kind).new += 1,
            ChangeEvent::ComponentCreated(summary) => {
                self.report.components.new += 1;
                self.report.new_components.push(summary);
            }
            ChangeEvent::Updated(kind) => self.counts_mut(kind).updated += 1,
            ChangeEvent::Deleted(kind) => self.counts_mut(kind).deleted += 1,
            ChangeEvent::CacheHit(kind) => self.counts_mut(kind).cache_hit += 1,
        }
    }

    pub fn snapshot(&self) -> Report {
        self.report.clone()
    }

    /// Zero every counter, empty the lists and restart the session clock.
    pub fn reset(&mut self) {
        *self = Self::new(self.report.simulate);
    }

    fn counts_mut(&mut self, kind: EntityKind) -> &mut Counts {
        match kind {
            EntityKind::Component => &mut self.report.components,
            EntityKind::Reference => &mut self.report.references,
        }
    }
}
