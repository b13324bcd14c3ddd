//! # Component — Shared Payloads Keyed by Explicit Tags
//!
//! A component is an opaque data payload attached to an entity at runtime.
//! The registry never looks inside one; it stores [`Component`] handles
//! (`Rc<dyn Any>`) and hands them back on request. Callers recover the
//! concrete type with [`component_as`].
//!
//! ## Design: Tags Instead of Type Ids
//!
//! Component kinds are distinguished by a [`ComponentTag`] the embedder
//! assigns, not by `TypeId`. A tag is an ordinary `u32` known at build time:
//!
//! ```
//! use skra::ComponentTag;
//!
//! const POSITION: ComponentTag = ComponentTag::new(1);
//! const HEALTH: ComponentTag = ComponentTag::new(2);
//! ```
//!
//! Tags must be stable and unique per logical kind for the lifetime of the
//! registry; nothing checks that two payload types don't share a tag. In
//! exchange, kind identity is decoupled from payload type: two different
//! payload types can serve the same tag over a program's evolution, and a
//! kind can be referred to without naming a type at all.
//!
//! ## Shared Ownership
//!
//! Each attached payload is held by two tables at once (the per-entity map
//! and the per-tag node view), plus whatever clones callers retain. The
//! payload drops when the last `Rc` goes away, and exactly then. Since
//! handles are shared, payloads with mutable state use `Cell`/`RefCell`
//! fields internally.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::entity::EntityId;

/// Key identifying a component *kind*. Assigned by the embedder, stable and
/// unique per logical kind for the lifetime of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentTag(u32);

impl ComponentTag {
    /// Make a tag from a raw discriminator.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw discriminator.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared handle to an opaque component payload.
pub type Component = Rc<dyn Any>;

/// The entities holding a component of one tag, each mapped to its payload.
///
/// Ordered by id, so traversal order is deterministic.
pub type EntityNodes = BTreeMap<EntityId, Component>;

/// Shared handle to a live [`EntityNodes`] view.
///
/// Obtained from
/// [`Registry::entity_nodes`](crate::registry::Registry::entity_nodes). The
/// view tracks the registry: attaches, detaches, and destroys performed
/// after the handle was obtained are visible through it.
pub type NodesRef = Rc<RefCell<EntityNodes>>;

/// Downcast a component payload to its concrete type.
///
/// Returns `None` if the payload is not a `T`. Intended for callers walking
/// an [`EntityNodes`] view, which yields type-erased handles:
///
/// ```
/// use skra::prelude::*;
/// use std::rc::Rc;
///
/// const HEALTH: ComponentTag = ComponentTag::new(1);
/// struct Health(u32);
///
/// let mut registry = Registry::new();
/// let id = registry.create();
/// registry.attach(id, HEALTH, Rc::new(Health(100)));
///
/// for (_id, component) in registry.entity_nodes(HEALTH).borrow().iter() {
///     let health = component_as::<Health>(component).unwrap();
///     assert_eq!(health.0, 100);
/// }
/// ```
pub fn component_as<T: 'static>(component: &Component) -> Option<Rc<T>> {
    Rc::clone(component).downcast::<T>().ok()
}
