//! Upsert orchestrator.
//!
//! For each candidate the orchestrator decides between reuse, update and
//! create, in a fixed order:
//!
//! 1. Make sure the owning workspace is cached (one fetch per workspace).
//! 2. Match the candidate against the cached graph.
//! 3. Diff against the match; merge and update when something changed.
//! 4. Create when nothing matched.
//! 5. Write the remote answer back into the cache and record the outcome.
//!
//! In simulation mode steps 1 and 2 still read from the transport, but no
//! create, update or delete is ever sent and the cache is left untouched.

use ardoq_core::{
    Component, ComponentQuery, Entity, EntityId, EntityKind, Fields, Reference, Transport,
    WorkspaceId,
};

use crate::cache::WorkspaceCache;
use crate::diff;
use crate::error::{malformed, SyncError};
use crate::matcher;
use crate::report::{ChangeEvent, ChangeReporter, NewComponent, Report};

// ---------------------------------------------------------------------------
// Upsert result
// ---------------------------------------------------------------------------

/// What an upsert did (or, in simulation mode, would have done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertAction {
    /// No match: the entity was created remotely.
    Created,
    /// Matched and drifted: the merged entity was sent as an update.
    Updated { changed: Vec<String> },
    /// Matched with no difference: nothing was sent.
    Unchanged,
    /// Simulation: the entity would have been created.
    WouldCreate,
    /// Simulation: the matched entity would have been updated.
    WouldUpdate { changed: Vec<String> },
}

impl UpsertAction {
    /// Whether the action stands for a remote mutation, real or simulated.
    pub fn is_change(&self) -> bool {
        !matches!(self, UpsertAction::Unchanged)
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpsertAction::Created => "created",
            UpsertAction::Updated { .. } => "updated",
            UpsertAction::Unchanged => "unchanged",
            UpsertAction::WouldCreate => "would create",
            UpsertAction::WouldUpdate { .. } => "would update",
        }
    }

    /// Candidate keys that differed from the matched entity.
    pub fn changed(&self) -> &[String] {
        match self {
            UpsertAction::Updated { changed } | UpsertAction::WouldUpdate { changed } => changed,
            _ => &[],
        }
    }
}

/// The resulting entity together with the action taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<E> {
    pub entity: E,
    pub action: UpsertAction,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owns the session state of one sync run: the transport, the workspace
/// cache and the change report.
///
/// Not meant to be shared between threads; callers that need concurrent
/// access must serialize it per workspace.
#[derive(Debug)]
pub struct Orchestrator<T> {
    transport: T,
    cache: WorkspaceCache,
    reporter: ChangeReporter,
    simulate: bool,
    placeholder_seq: u64,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(transport: T, simulate: bool) -> Self {
        Self {
            transport,
            cache: WorkspaceCache::new(),
            reporter: ChangeReporter::new(simulate),
            simulate,
            placeholder_seq: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn cache(&self) -> &WorkspaceCache {
        &self.cache
    }

    pub fn report(&self) -> Report {
        self.reporter.snapshot()
    }

    pub fn reset_report(&mut self) {
        self.reporter.reset();
    }

    // -----------------------------------------------------------------------
    // Upserts
    // -----------------------------------------------------------------------

    /// Create, update or reuse the component `candidate` describes.
    ///
    /// `match_field` replaces the default name rule, see
    /// [`matcher::find_component`].
    pub fn upsert_component(
        &mut self,
        mut candidate: Component,
        match_field: Option<&str>,
    ) -> Result<Upserted<Component>, SyncError> {
        validate_candidate(&candidate)?;
        let workspace = self
            .cache
            .ensure_loaded(&mut self.transport, &candidate.root_workspace)?;
        let found = matcher::find_component(workspace, &candidate, match_field)?
            .map(|(index, existing)| (index, existing.clone()));
        // The name rule matched case-insensitively, so the cased name on record
        // stands and is neither diffed nor overwritten.
        if let (None, Some((_, existing))) = (match_field, &found) {
            if existing.name.to_lowercase() == candidate.name.to_lowercase() {
                candidate.name = existing.name.clone();
            }
        }
        self.apply(candidate, found, |c: &Component| {
            ChangeEvent::ComponentCreated(NewComponent {
                id: c.id.clone().unwrap_or_else(|| EntityId::from("")),
                name: c.name.clone(),
                type_id: c.type_id.clone(),
            })
        })
    }

    /// Create, update or reuse the reference `candidate` describes.
    ///
    /// References are identified by their `(type, source, target)` triple, so
    /// changing any other attribute yields an update, never a second edge.
    pub fn upsert_reference(
        &mut self,
        candidate: Reference,
    ) -> Result<Upserted<Reference>, SyncError> {
        validate_candidate(&candidate)?;
        let workspace = self
            .cache
            .ensure_loaded(&mut self.transport, &candidate.root_workspace)?;
        let found = matcher::find_reference(workspace, &candidate)
            .map(|(index, existing)| (index, existing.clone()));
        self.apply(candidate, found, |_: &Reference| {
            ChangeEvent::Created(EntityKind::Reference)
        })
    }

    fn apply<E: Entity>(
        &mut self,
        candidate: E,
        found: Option<(usize, E)>,
        created_event: impl FnOnce(&E) -> ChangeEvent,
    ) -> Result<Upserted<E>, SyncError> {
        let workspace = candidate.root_workspace().clone();
        let candidate_fields = candidate.to_fields()?;

        let Some((index, existing)) = found else {
            return self.create(candidate, candidate_fields, created_event);
        };

        let existing_fields = existing.to_fields()?;
        let changed = diff::changed_keys(&existing_fields, &candidate_fields);
        if changed.is_empty() {
            tracing::debug!(kind = %E::KIND, "cache hit: {}", existing.label());
            self.reporter.record(ChangeEvent::CacheHit(E::KIND));
            return Ok(Upserted {
                entity: existing,
                action: UpsertAction::Unchanged,
            });
        }

        let merged = diff::merge(&existing_fields, &candidate_fields);

        if self.simulate {
            self.reporter.record(ChangeEvent::Updated(E::KIND));
            tracing::info!(
                kind = %E::KIND,
                changed = ?changed,
                "[simulate] would update: {}",
                existing.label()
            );
            return Ok(Upserted {
                entity: E::from_fields(merged)?,
                action: UpsertAction::WouldUpdate { changed },
            });
        }

        let id = existing.id().cloned().ok_or_else(|| SyncError::MissingId {
            kind: E::KIND,
            label: existing.label(),
        })?;
        let response = self.transport.update_entity(E::KIND, &id, &merged)?;
        let updated = E::from_fields(response)?;
        self.cache.replace_entity(&workspace, index, updated.clone());
        self.reporter.record(ChangeEvent::Updated(E::KIND));
        tracing::info!(kind = %E::KIND, %id, changed = ?changed, "updated: {}", updated.label());
        Ok(Upserted {
            entity: updated,
            action: UpsertAction::Updated { changed },
        })
    }

    fn create<E: Entity>(
        &mut self,
        mut candidate: E,
        body: Fields,
        created_event: impl FnOnce(&E) -> ChangeEvent,
    ) -> Result<Upserted<E>, SyncError> {
        if self.simulate {
            candidate.set_id(self.next_placeholder());
            tracing::info!(kind = %E::KIND, "[simulate] would create: {}", candidate.label());
            self.reporter.record(created_event(&candidate));
            return Ok(Upserted {
                entity: candidate,
                action: UpsertAction::WouldCreate,
            });
        }

        let workspace = candidate.root_workspace().clone();
        let response = self.transport.create_entity(E::KIND, &body)?;
        let created = E::from_fields(response)?;
        if created.id().is_none() {
            return Err(SyncError::MissingId {
                kind: E::KIND,
                label: created.label(),
            });
        }
        self.cache.append_entity(&workspace, created.clone());
        tracing::info!(kind = %E::KIND, id = ?created.id(), "created: {}", created.label());
        self.reporter.record(created_event(&created));
        Ok(Upserted {
            entity: created,
            action: UpsertAction::Created,
        })
    }

    fn next_placeholder(&mut self) -> EntityId {
        self.placeholder_seq += 1;
        EntityId(format!("simulated-{}", self.placeholder_seq))
    }

    // -----------------------------------------------------------------------
    // Updates by identifier
    // -----------------------------------------------------------------------

    /// Update a component whose identifier the caller already knows.
    ///
    /// Matching is bypassed. The identifier must be present in the cached
    /// workspace; otherwise [`SyncError::InvariantViolation`] is returned
    /// before anything is sent.
    pub fn update_component(
        &mut self,
        id: &EntityId,
        candidate: Component,
    ) -> Result<Upserted<Component>, SyncError> {
        self.update_by_id(id, candidate)
    }

    pub fn update_reference(
        &mut self,
        id: &EntityId,
        candidate: Reference,
    ) -> Result<Upserted<Reference>, SyncError> {
        self.update_by_id(id, candidate)
    }

    fn update_by_id<E: Entity>(
        &mut self,
        id: &EntityId,
        mut candidate: E,
    ) -> Result<Upserted<E>, SyncError> {
        validate_candidate(&candidate)?;
        let workspace_id = candidate.root_workspace().clone();
        let workspace = self.cache.ensure_loaded(&mut self.transport, &workspace_id)?;
        let cached = E::collection(workspace)
            .iter()
            .enumerate()
            .find(|(_, e)| e.id() == Some(id))
            .map(|(index, e)| (index, e.clone()));

        candidate.set_id(id.clone());
        let body = candidate.to_fields()?;
        let changed = match &cached {
            Some((_, existing)) => diff::changed_keys(&existing.to_fields()?, &body),
            None => body.keys().cloned().collect(),
        };

        if self.simulate {
            tracing::info!(kind = %E::KIND, %id, "[simulate] would update: {}", candidate.label());
            self.reporter.record(ChangeEvent::Updated(E::KIND));
            return Ok(Upserted {
                entity: candidate,
                action: UpsertAction::WouldUpdate { changed },
            });
        }

        let Some((index, _)) = cached else {
            return Err(SyncError::InvariantViolation {
                kind: E::KIND,
                id: id.clone(),
                workspace: workspace_id,
            });
        };

        let response = self.transport.update_entity(E::KIND, id, &body)?;
        let updated = E::from_fields(response)?;
        self.cache.replace_entity(&workspace_id, index, updated.clone());
        self.reporter.record(ChangeEvent::Updated(E::KIND));
        tracing::info!(kind = %E::KIND, %id, "updated: {}", updated.label());
        Ok(Upserted {
            entity: updated,
            action: UpsertAction::Updated { changed },
        })
    }

    // -----------------------------------------------------------------------
    // Deletes
    // -----------------------------------------------------------------------

    /// Delete a component remotely and drop it from the cache.
    ///
    /// Returns the identifier that was (or would have been) deleted.
    pub fn delete_component(&mut self, id: &EntityId) -> Result<EntityId, SyncError> {
        self.delete::<Component>(id)
    }

    pub fn delete_reference(&mut self, id: &EntityId) -> Result<EntityId, SyncError> {
        self.delete::<Reference>(id)
    }

    fn delete<E: Entity>(&mut self, id: &EntityId) -> Result<EntityId, SyncError> {
        if self.simulate {
            tracing::info!(kind = %E::KIND, %id, "[simulate] would delete");
        } else {
            self.transport.delete_entity(E::KIND, id)?;
            let pruned = self.cache.remove_entity::<E>(id);
            tracing::info!(kind = %E::KIND, %id, pruned, "deleted");
        }
        self.reporter.record(ChangeEvent::Deleted(E::KIND));
        Ok(id.clone())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Components of `workspace` satisfying `query`.
    ///
    /// Served from the cache when the workspace is loaded; otherwise the
    /// query goes to the remote search, which does not populate the cache.
    pub fn find_components(
        &mut self,
        workspace: &WorkspaceId,
        query: &ComponentQuery,
    ) -> Result<Vec<Component>, SyncError> {
        if let Some(cached) = self.cache.get(workspace) {
            tracing::debug!(%workspace, "component query served from cache");
            return Ok(matcher::search_components(cached, query));
        }
        Ok(self.transport.search_components(workspace, query)?)
    }
}

/// Reject candidates that cannot be placed in exactly one cached workspace.
fn validate_candidate<E: Entity>(candidate: &E) -> Result<(), SyncError> {
    if candidate.root_workspace().0.trim().is_empty() {
        return Err(malformed(
            E::KIND,
            format!("'{}' has no rootWorkspace", candidate.label()),
        ));
    }
    let shadowed = candidate.shadowing_attributes();
    if !shadowed.is_empty() {
        return Err(malformed(
            E::KIND,
            format!(
                "'{}' sets modelled field(s) {} as attributes",
                candidate.label(),
                shadowed.join(", ")
            ),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ardoq_client::{Call, MemoryTransport};
    use ardoq_core::{TransportError, Workspace};

    fn remote() -> MemoryTransport {
        let mut ws = Workspace::new("W");
        let mut comp = Component::new("svc-a", "T1", "W");
        comp.id = Some("c1".into());
        comp.version = Some(1);
        ws.components.push(comp);
        MemoryTransport::new().with_workspace(ws)
    }

    #[test]
    fn case_different_name_is_a_cache_hit() {
        let mut orch = Orchestrator::new(remote(), false);
        let result = orch
            .upsert_component(Component::new("SVC-A", "T1", "W"), None)
            .expect("upsert");

        assert_eq!(result.action, UpsertAction::Unchanged);
        assert_eq!(result.entity.id, Some("c1".into()));
        assert_eq!(orch.transport().mutation_count(), 0);
        assert_eq!(orch.report().components.cache_hit, 1);
    }

    #[test]
    fn different_type_creates_once() {
        let mut orch = Orchestrator::new(remote(), false);
        let result = orch
            .upsert_component(Component::new("svc-a", "T2", "W"), None)
            .expect("upsert");

        assert_eq!(result.action, UpsertAction::Created);
        assert_eq!(
            orch.transport().calls(),
            &[Call::Fetch("W".into()), Call::Create(EntityKind::Component)]
        );
        let report = orch.report();
        assert_eq!(report.components.new, 1);
        assert_eq!(report.new_components[0].type_id, "T2".into());
        assert_eq!(orch.cache().get(&"W".into()).expect("cached").components.len(), 2);
    }

    #[test]
    fn drift_merges_and_updates_in_place() {
        let mut orch = Orchestrator::new(remote(), false);
        let result = orch
            .upsert_component(Component::new("svc-a", "T1", "W").with("owner", "team-a"), None)
            .expect("upsert");

        assert_eq!(
            result.action,
            UpsertAction::Updated { changed: vec!["owner".to_string()] }
        );
        assert_eq!(result.entity.version, Some(2));
        let cached = &orch.cache().get(&"W".into()).expect("cached").components[0];
        assert_eq!(cached.attributes.get("owner"), Some(&serde_json::Value::from("team-a")));
        assert_eq!(cached.version, Some(2));
    }

    #[test]
    fn simulation_never_mutates() {
        let mut orch = Orchestrator::new(remote(), true);
        let created = orch
            .upsert_component(Component::new("svc-b", "T1", "W"), None)
            .expect("create");
        let updated = orch
            .upsert_component(Component::new("svc-a", "T1", "W").with("owner", "x"), None)
            .expect("update");
        let deleted = orch.delete_component(&"c1".into()).expect("delete");

        assert_eq!(created.action, UpsertAction::WouldCreate);
        assert_eq!(created.entity.id, Some("simulated-1".into()));
        assert!(matches!(updated.action, UpsertAction::WouldUpdate { .. }));
        assert_eq!(deleted, EntityId::from("c1"));
        assert_eq!(orch.transport().mutation_count(), 0);

        let ws = orch.cache().get(&"W".into()).expect("cached");
        assert_eq!(ws.components.len(), 1, "simulation must not touch the cache");
        assert!(ws.components[0].attributes.is_empty());

        let report = orch.report();
        assert!(report.simulate);
        assert_eq!(report.components.new, 1);
        assert_eq!(report.components.updated, 1);
        assert_eq!(report.components.deleted, 1);
    }

    #[test]
    fn placeholders_are_unique_per_session() {
        let mut orch = Orchestrator::new(remote(), true);
        let a = orch
            .upsert_component(Component::new("x", "T1", "W"), None)
            .expect("a");
        let b = orch
            .upsert_reference(Reference::new(2, "c1", "c1", "W"))
            .expect("b");
        assert_ne!(a.entity.id, b.entity.id);
    }

    #[test]
    fn empty_root_workspace_is_rejected_before_any_call() {
        let mut orch = Orchestrator::new(remote(), false);
        let err = orch
            .upsert_component(Component::new("svc-a", "T1", ""), None)
            .unwrap_err();
        assert!(matches!(err, SyncError::MalformedCandidate { .. }), "got {err}");
        assert!(orch.transport().calls().is_empty());
    }

    #[test]
    fn attribute_overriding_root_workspace_is_rejected_before_any_call() {
        let mut orch = Orchestrator::new(remote(), false);
        let err = orch
            .upsert_component(Component::new("svc-x", "T1", "W").with("rootWorkspace", "X"), None)
            .unwrap_err();
        assert!(matches!(err, SyncError::MalformedCandidate { .. }), "got {err}");
        assert!(err.to_string().contains("rootWorkspace"), "got {err}");
        assert!(orch.transport().calls().is_empty());

        let err = orch
            .upsert_reference(Reference::new(2, "c1", "c1", "W").with("target", "c9"))
            .unwrap_err();
        assert!(matches!(err, SyncError::MalformedCandidate { .. }), "got {err}");
        assert!(orch.transport().calls().is_empty());
    }

    #[test]
    fn case_different_name_with_drift_keeps_the_recorded_name() {
        let mut orch = Orchestrator::new(remote(), false);
        let result = orch
            .upsert_component(Component::new("Svc-A", "T1", "W").with("owner", "team-a"), None)
            .expect("upsert");

        assert_eq!(
            result.action,
            UpsertAction::Updated { changed: vec!["owner".to_string()] }
        );
        assert_eq!(result.entity.name, "svc-a");
        assert_eq!(orch.transport().mutation_count(), 1);
    }

    #[test]
    fn update_by_unknown_id_is_an_invariant_violation() {
        let mut orch = Orchestrator::new(remote(), false);
        let err = orch
            .update_component(&"nope".into(), Component::new("svc-a", "T1", "W"))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvariantViolation { .. }), "got {err}");
        assert_eq!(orch.transport().mutation_count(), 0);
    }

    #[test]
    fn update_by_id_splices_response() {
        let mut orch = Orchestrator::new(remote(), false);
        let mut candidate = Component::new("svc-a", "T1", "W").with("owner", "team-b");
        candidate.version = Some(1);
        let result = orch.update_component(&"c1".into(), candidate).expect("update");

        assert_eq!(result.entity.version, Some(2));
        assert_eq!(orch.report().components.updated, 1);
        let cached = &orch.cache().get(&"W".into()).expect("cached").components[0];
        assert_eq!(cached.attributes.get("owner"), Some(&serde_json::Value::from("team-b")));
    }

    #[test]
    fn delete_prunes_cache() {
        let mut orch = Orchestrator::new(remote(), false);
        orch.upsert_component(Component::new("svc-a", "T1", "W"), None)
            .expect("load");
        orch.delete_component(&"c1".into()).expect("delete");

        assert!(orch.cache().get(&"W".into()).expect("cached").components.is_empty());
        let again = orch
            .upsert_component(Component::new("svc-a", "T1", "W"), None)
            .expect("recreate");
        assert_eq!(again.action, UpsertAction::Created);
    }

    #[test]
    fn delete_of_missing_entity_propagates_not_found() {
        let mut orch = Orchestrator::new(remote(), false);
        let err = orch.delete_reference(&"r9".into()).unwrap_err();
        assert!(matches!(err, SyncError::Transport(TransportError::NotFound(_))));
        assert_eq!(orch.report().references.deleted, 0);
    }

    #[test]
    fn find_uses_cache_once_loaded() {
        let mut orch = Orchestrator::new(remote(), false);
        let query = ComponentQuery::by_name("svc", false);

        let remote_hits = orch.find_components(&"W".into(), &query).expect("remote");
        assert_eq!(remote_hits.len(), 1);
        assert!(orch.cache().is_empty(), "remote search must not populate the cache");

        orch.upsert_component(Component::new("svc-a", "T1", "W"), None)
            .expect("load");
        orch.transport_mut().clear_calls();
        let cached_hits = orch.find_components(&"W".into(), &query).expect("cached");
        assert_eq!(cached_hits, remote_hits);
        assert!(orch.transport().calls().is_empty());
    }
}
