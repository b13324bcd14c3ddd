//! # Skra — Runtime Entity/Component Registry
//!
//! A small registry binding opaque entity ids to runtime-attached data
//! payloads ("components"), with fast lookup both by entity and by
//! component kind. Built for simulation and game-loop code that wants to
//! iterate "every object with capability X" without a static object
//! hierarchy.
//!
//! ```
//! use skra::prelude::*;
//! use std::rc::Rc;
//!
//! const HEALTH: ComponentTag = ComponentTag::new(1);
//!
//! struct Health {
//!     points: u32,
//! }
//!
//! let mut registry = Registry::new();
//! let id = registry.create();
//! registry.attach(id, HEALTH, Rc::new(Health { points: 100 }));
//!
//! // Per-entity lookup.
//! let component = registry.get(id, HEALTH).unwrap();
//! assert_eq!(component_as::<Health>(&component).unwrap().points, 100);
//!
//! // Per-kind iteration.
//! for (id, component) in registry.entity_nodes(HEALTH).borrow().iter() {
//!     let health = component_as::<Health>(component).unwrap();
//!     println!("entity {id} has {} hit points", health.points);
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`entity`] — entity ids and the reuse-scanning id allocator
//! - [`component`] — tags, shared payload handles, node-view types
//! - [`registry`] — the dual-indexed store and the mark/purge protocol
//! - [`math`] — glam re-exports for payload value types
//!
//! ## Destroying While Iterating
//!
//! Entities must not be destroyed while a node view is being traversed.
//! Mark them with [`Registry::mark_for_removal`] during the pass and call
//! [`Registry::purge`] after it; the [`registry`] module docs show the
//! pattern.
//!
//! ## Threading
//!
//! Strictly single-threaded: payloads are held in `Rc`, so the registry is
//! `!Send` and `!Sync` and the constraint is enforced at compile time. Wrap
//! the whole registry in one exclusive lock if an embedding ever needs to
//! share it; the data model does not support finer-grained locking, because
//! attach/detach update two tables per call.

pub mod component;
pub mod entity;
pub mod math;
pub mod prelude;
pub mod registry;
pub(crate) mod removal;

pub use component::{Component, ComponentTag, EntityNodes, NodesRef, component_as};
pub use entity::EntityId;
pub use registry::Registry;
