//! # Registry — The Dual-Indexed Component Store
//!
//! The [`Registry`] owns all entities and their attached components, indexed
//! two ways at once:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Registry                                                   │
//! │                                                            │
//! │  entities: EntityId → { ComponentTag → Component }         │
//! │    one entry per live entity; the source of truth          │
//! │                                                            │
//! │  nodes_by_tag: ComponentTag → Rc<RefCell<EntityNodes>>     │
//! │    reverse index, one live view per tag ever requested     │
//! │                                                            │
//! │  removal: pending EntityIds awaiting purge()               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both tables hold clones of the same `Rc` for every attached payload.
//! Every mutating operation updates the entity table first and the reverse
//! index within the same call, so observers never see the two disagree.
//!
//! ## Expected Failures vs. Corruption
//!
//! Unknown ids, duplicate attaches, and detaches of absent components are
//! ordinary outcomes, reported through `bool`/`Option` returns. A mismatch
//! *between* the two tables is different: it means some defect has broken
//! the registry's invariant, the store can no longer be trusted, and the
//! operation panics rather than papering over it. Corrupting operations are
//! documented under `# Panics`.
//!
//! ## Iterating a Tag
//!
//! [`Registry::entity_nodes`] returns a shared live view of every entity
//! holding a given tag. While traversing it, destroy nothing; mark instead:
//!
//! ```
//! use skra::prelude::*;
//! use std::rc::Rc;
//!
//! const HEALTH: ComponentTag = ComponentTag::new(1);
//! struct Health(u32);
//!
//! let mut registry = Registry::new();
//! for points in [0u32, 50, 100] {
//!     let id = registry.create();
//!     registry.attach(id, HEALTH, Rc::new(Health(points)));
//! }
//!
//! let nodes = registry.entity_nodes(HEALTH);
//! for (&id, component) in nodes.borrow().iter() {
//!     let health = component_as::<Health>(component).unwrap();
//!     if health.0 == 0 {
//!         registry.mark_for_removal(id);
//!     }
//! }
//! registry.purge();
//!
//! assert_eq!(registry.entity_count(), 2);
//! ```
//!
//! ## Threading
//!
//! Single-threaded by construction: payload handles are `Rc`, so the
//! registry is neither `Send` nor `Sync` and cross-thread use fails to
//! compile. Every operation runs to completion synchronously; the registry
//! never calls back into embedder code.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use crate::component::{Component, ComponentTag, NodesRef};
use crate::entity::{EntityAllocator, EntityId};
use crate::removal::RemovalQueue;

/// The central store binding entity ids to runtime-attached components.
pub struct Registry {
    allocator: EntityAllocator,
    /// Per-entity component sets. An entity is live iff it has an entry
    /// here, even if the set is empty.
    entities: HashMap<EntityId, HashMap<ComponentTag, Component>>,
    /// Reverse index. Entries are created lazily per tag and persist even
    /// when empty, because callers may hold the view.
    nodes_by_tag: HashMap<ComponentTag, NodesRef>,
    removal: RemovalQueue,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: HashMap::new(),
            nodes_by_tag: HashMap::new(),
            removal: RemovalQueue::new(),
        }
    }

    // ── Entity Lifecycle ─────────────────────────────────────────────

    /// Create an entity with no components.
    ///
    /// Returns [`EntityId::INVALID`] if the id space is exhausted. There is
    /// no way to recover capacity short of destroying entities, so
    /// exhaustion is also logged at warn level.
    pub fn create(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        if !id.is_valid() {
            log::warn!("entity id space exhausted; create() returning the invalid id");
            return EntityId::INVALID;
        }

        match self.entities.entry(id) {
            Entry::Occupied(_) => {
                // Unreachable while the allocator's live set and this table
                // agree; kept as a guarded failure rather than a fault.
                log::error!("allocator issued id {id} but an entity with that id already exists");
                self.allocator.release(id);
                EntityId::INVALID
            }
            Entry::Vacant(slot) => {
                slot.insert(HashMap::new());
                id
            }
        }
    }

    /// Destroy an entity, removing it and all its components from both
    /// tables and freeing its id for eventual reuse.
    ///
    /// Returns `false` if `id` is unknown (never created, already destroyed,
    /// or invalid).
    ///
    /// # Panics
    ///
    /// Panics if a component the entity holds has no counterpart in the
    /// reverse index. That disagreement means the registry has been
    /// corrupted by a defect; its state can no longer be trusted.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(components) = self.entities.remove(&id) else {
            return false;
        };

        for (tag, _component) in components {
            let Some(nodes) = self.nodes_by_tag.get(&tag) else {
                panic!("registry corrupted: no node table for component {tag} held by entity {id}");
            };
            if nodes.borrow_mut().remove(&id).is_none() {
                panic!(
                    "registry corrupted: entity {id} missing from the node table for component {tag}"
                );
            }
        }

        self.allocator.release(id);
        true
    }

    /// Destroy every entity.
    ///
    /// Clears both tables wholesale, dropping every table-held payload
    /// reference. Caller-held [`NodesRef`] views detach: they keep whatever
    /// they referenced alive but no longer track the registry. The pending
    /// removal list is not touched; only [`Registry::purge`] drains it.
    pub fn destroy_all(&mut self) {
        self.entities.clear();
        self.nodes_by_tag.clear();
        self.allocator.clear();
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach a component to an entity under the given tag.
    ///
    /// Returns `false` if `id` is unknown or the entity already holds a
    /// component of this tag; the original payload is left in place. On
    /// success the same payload handle is inserted into both tables,
    /// creating the tag's node table if this is its first use.
    ///
    /// # Panics
    ///
    /// Panics if the reverse index already lists this entity for the tag
    /// while the entity table does not (corruption, see [`Registry::destroy`]).
    pub fn attach(&mut self, id: EntityId, tag: ComponentTag, component: Component) -> bool {
        let Some(components) = self.entities.get_mut(&id) else {
            return false;
        };
        if components.contains_key(&tag) {
            return false;
        }

        components.insert(tag, Rc::clone(&component));

        let nodes = self.nodes_by_tag.entry(tag).or_default();
        if nodes.borrow_mut().insert(id, component).is_some() {
            panic!("registry corrupted: node table for component {tag} already listed entity {id}");
        }
        true
    }

    /// Detach the component of the given tag from an entity.
    ///
    /// Returns `false` if `id` is unknown or the entity holds no component
    /// of this tag. The tag's node table stays in place, possibly empty.
    ///
    /// # Panics
    ///
    /// Panics if the entity held the component but the reverse index has no
    /// matching entry (corruption, see [`Registry::destroy`]).
    pub fn detach(&mut self, id: EntityId, tag: ComponentTag) -> bool {
        let Some(components) = self.entities.get_mut(&id) else {
            return false;
        };
        if components.remove(&tag).is_none() {
            return false;
        }

        let Some(nodes) = self.nodes_by_tag.get(&tag) else {
            panic!("registry corrupted: no node table for component {tag} detached from entity {id}");
        };
        if nodes.borrow_mut().remove(&id).is_none() {
            panic!(
                "registry corrupted: entity {id} missing from the node table for component {tag}"
            );
        }
        true
    }

    /// Get the component of the given tag attached to an entity.
    ///
    /// Read-only; never faults. The returned handle stays valid for as long
    /// as the caller keeps it, independent of the entity's fate.
    pub fn get(&self, id: EntityId, tag: ComponentTag) -> Option<Component> {
        self.entities.get(&id)?.get(&tag).map(Rc::clone)
    }

    // ── Node Views ───────────────────────────────────────────────────

    /// The live view of every entity holding a component of `tag`, mapped to
    /// its payload. Created empty on first request for the tag and retained
    /// for the registry's lifetime thereafter.
    ///
    /// The view is shared, not a snapshot: attaches, detaches, and destroys
    /// performed after this call are visible through it.
    ///
    /// Do not destroy entities while holding a borrow of the view; the
    /// destroy would need a write borrow of the same `RefCell` and panic.
    /// Decide during traversal with [`Registry::mark_for_removal`], then
    /// apply the decisions with [`Registry::purge`] once the borrow is
    /// released. The module docs show the full pattern.
    pub fn entity_nodes(&mut self, tag: ComponentTag) -> NodesRef {
        Rc::clone(self.nodes_by_tag.entry(tag).or_default())
    }

    // ── Deferred Removal ─────────────────────────────────────────────

    /// Queue an entity for destruction at the next [`Registry::purge`].
    ///
    /// Ignored if `id` is not currently live. Marking the same id more than
    /// once is allowed; the duplicates are skipped at purge time.
    pub fn mark_for_removal(&mut self, id: EntityId) {
        if self.entities.contains_key(&id) {
            self.removal.mark(id);
        }
    }

    /// Destroy every entity marked since the last purge, in mark order.
    ///
    /// Ids that are no longer live by the time they come up (duplicate
    /// marks, or destroyed by other means in between) are skipped. The
    /// pending list is left empty regardless of individual outcomes.
    pub fn purge(&mut self) {
        for id in self.removal.take() {
            // Already-destroyed ids report false here; that is the
            // documented way duplicates resolve.
            self.destroy(id);
        }
    }

    // ── Introspection ────────────────────────────────────────────────

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Whether `id` is live and holds a component of `tag`.
    pub fn has(&self, id: EntityId, tag: ComponentTag) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|components| components.contains_key(&tag))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;

    use super::*;
    use crate::component::component_as;

    const HEALTH: ComponentTag = ComponentTag::new(1);
    const ARMOR: ComponentTag = ComponentTag::new(2);

    struct Health(u32);
    struct Armor;

    #[test]
    fn created_ids_are_distinct_and_valid() {
        let mut registry = Registry::new();
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let id = registry.create();
            assert!(id.is_valid());
            assert!(seen.insert(id)); // no repeats
        }
        assert_eq!(registry.entity_count(), 10);
    }

    #[test]
    fn destroy_succeeds_exactly_once() {
        let mut registry = Registry::new();
        let id = registry.create();

        assert!(registry.destroy(id));
        assert!(!registry.destroy(id));
        assert!(!registry.contains(id));
    }

    #[test]
    fn destroy_unknown_id_returns_false() {
        let mut registry = Registry::new();
        assert!(!registry.destroy(EntityId::INVALID));
    }

    #[test]
    fn destroy_all_invalidates_every_id() {
        let mut registry = Registry::new();
        let ids: Vec<EntityId> = (0..10).map(|_| registry.create()).collect();

        registry.destroy_all();

        assert_eq!(registry.entity_count(), 0);
        for id in ids {
            assert!(!registry.destroy(id));
        }
    }

    #[test]
    fn attach_and_get() {
        let mut registry = Registry::new();
        let id = registry.create();

        assert!(registry.attach(id, HEALTH, Rc::new(Health(100))));
        assert!(registry.has(id, HEALTH));

        let component = registry.get(id, HEALTH).unwrap();
        assert_eq!(component_as::<Health>(&component).unwrap().0, 100);

        // Absent tag reads as None, not an error.
        assert!(registry.get(id, ARMOR).is_none());
    }

    #[test]
    fn attach_to_unknown_entity_fails() {
        let mut registry = Registry::new();
        let id = registry.create();
        registry.destroy(id);

        assert!(!registry.attach(id, HEALTH, Rc::new(Health(1))));
    }

    #[test]
    fn duplicate_attach_keeps_original() {
        let mut registry = Registry::new();
        let id = registry.create();
        let first: Component = Rc::new(Health(100));

        assert!(registry.attach(id, HEALTH, Rc::clone(&first)));
        assert!(!registry.attach(id, HEALTH, Rc::new(Health(5))));

        let held = registry.get(id, HEALTH).unwrap();
        assert!(Rc::ptr_eq(&held, &first));
    }

    #[test]
    fn attach_updates_node_view() {
        let mut registry = Registry::new();
        let id = registry.create();
        let component: Component = Rc::new(Health(42));
        registry.attach(id, HEALTH, Rc::clone(&component));

        let nodes = registry.entity_nodes(HEALTH);
        let view = nodes.borrow();
        assert!(Rc::ptr_eq(view.get(&id).unwrap(), &component));
    }

    #[test]
    fn detach_removes_from_both_tables() {
        let mut registry = Registry::new();
        let id = registry.create();
        registry.attach(id, HEALTH, Rc::new(Health(1)));
        let nodes = registry.entity_nodes(HEALTH);

        assert!(registry.detach(id, HEALTH));
        assert!(registry.get(id, HEALTH).is_none());
        assert!(!nodes.borrow().contains_key(&id));

        // Nothing left to detach.
        assert!(!registry.detach(id, HEALTH));
    }

    #[test]
    fn detach_from_unknown_entity_fails() {
        let mut registry = Registry::new();
        assert!(!registry.detach(EntityId::INVALID, HEALTH));
    }

    #[test]
    fn destroy_removes_components_from_node_views() {
        let mut registry = Registry::new();
        let id = registry.create();
        registry.attach(id, HEALTH, Rc::new(Health(1)));
        registry.attach(id, ARMOR, Rc::new(Armor));
        let health_nodes = registry.entity_nodes(HEALTH);
        let armor_nodes = registry.entity_nodes(ARMOR);

        assert!(registry.destroy(id));

        assert!(registry.get(id, HEALTH).is_none());
        assert!(health_nodes.borrow().is_empty());
        assert!(armor_nodes.borrow().is_empty());
    }

    #[test]
    fn entity_nodes_is_live_not_a_snapshot() {
        let mut registry = Registry::new();
        let nodes = registry.entity_nodes(HEALTH);
        assert!(nodes.borrow().is_empty());

        let id = registry.create();
        registry.attach(id, HEALTH, Rc::new(Health(1)));
        assert!(nodes.borrow().contains_key(&id));

        registry.detach(id, HEALTH);
        assert!(nodes.borrow().is_empty());
    }

    #[test]
    fn empty_node_tables_persist() {
        let mut registry = Registry::new();
        let first = registry.entity_nodes(HEALTH);

        let id = registry.create();
        registry.attach(id, HEALTH, Rc::new(Health(1)));
        registry.detach(id, HEALTH);

        // Emptied, not discarded: a later request returns the same table.
        let second = registry.entity_nodes(HEALTH);
        assert!(Rc::ptr_eq(&first, &second));
        assert!(second.borrow().is_empty());
    }

    #[test]
    fn views_partition_entities_by_tag() {
        let mut registry = Registry::new();
        let ids: Vec<EntityId> = (0..10).map(|_| registry.create()).collect();

        registry.attach(ids[3], ARMOR, Rc::new(Armor));
        registry.attach(ids[7], ARMOR, Rc::new(Armor));
        registry.attach(ids[7], HEALTH, Rc::new(Health(1)));

        let armor = registry.entity_nodes(ARMOR);
        assert_eq!(armor.borrow().len(), 2);
        assert!(armor.borrow().contains_key(&ids[3]));
        assert!(armor.borrow().contains_key(&ids[7]));

        let health = registry.entity_nodes(HEALTH);
        assert_eq!(health.borrow().len(), 1);
        assert!(health.borrow().contains_key(&ids[7]));
    }

    #[test]
    fn node_view_iterates_in_id_order() {
        let mut registry = Registry::new();
        let ids: Vec<EntityId> = (0..5).map(|_| registry.create()).collect();
        for &id in &ids {
            registry.attach(id, HEALTH, Rc::new(Health(0)));
        }

        let nodes = registry.entity_nodes(HEALTH);
        let walked: Vec<EntityId> = nodes.borrow().keys().copied().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(walked, sorted);
    }

    #[test]
    fn mark_then_purge_destroys() {
        let mut registry = Registry::new();
        let ids: Vec<EntityId> = (0..10).map(|_| registry.create()).collect();

        for &id in &ids {
            registry.mark_for_removal(id);
        }
        registry.purge();

        assert_eq!(registry.entity_count(), 0);
        for id in ids {
            assert!(!registry.destroy(id));
        }
    }

    #[test]
    fn duplicate_marks_destroy_once() {
        let mut registry = Registry::new();
        let id = registry.create();

        registry.mark_for_removal(id);
        registry.mark_for_removal(id);
        registry.purge(); // second entry finds the id gone; no fault

        assert!(!registry.contains(id));
    }

    #[test]
    fn mark_unknown_id_is_ignored() {
        let mut registry = Registry::new();
        let id = registry.create();
        registry.destroy(id);

        registry.mark_for_removal(id);
        registry.mark_for_removal(EntityId::INVALID);
        registry.purge();

        assert_eq!(registry.entity_count(), 0);
    }

    #[test]
    fn mark_during_traversal_then_purge() {
        let mut registry = Registry::new();
        for points in 0..5u32 {
            let id = registry.create();
            registry.attach(id, HEALTH, Rc::new(Health(points)));
        }

        let nodes = registry.entity_nodes(HEALTH);
        {
            let view = nodes.borrow();
            for (&id, component) in view.iter() {
                let health = component_as::<Health>(component).unwrap();
                if health.0 < 2 {
                    registry.mark_for_removal(id);
                }
            }
        }
        registry.purge();

        assert_eq!(registry.entity_count(), 3);
        assert_eq!(nodes.borrow().len(), 3);
    }

    // Payload with an observable destructor.
    struct Teardown {
        drops: Rc<Cell<u32>>,
    }

    impl Drop for Teardown {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn payload_drops_once_after_last_reference() {
        let drops = Rc::new(Cell::new(0u32));
        let mut registry = Registry::new();
        let id = registry.create();

        let payload = Rc::new(Teardown {
            drops: Rc::clone(&drops),
        });
        assert!(registry.attach(id, HEALTH, payload.clone()));

        // Both tables released their clones; ours still holds the payload.
        assert!(registry.destroy(id));
        assert_eq!(drops.get(), 0);

        drop(payload);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn destroy_all_releases_table_references() {
        let drops = Rc::new(Cell::new(0u32));
        let mut registry = Registry::new();
        let id = registry.create();
        registry.attach(
            id,
            HEALTH,
            Rc::new(Teardown {
                drops: Rc::clone(&drops),
            }),
        );

        registry.destroy_all();
        assert_eq!(drops.get(), 1);
    }
}
