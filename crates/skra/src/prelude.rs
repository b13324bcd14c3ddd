//! Convenience re-exports: `use skra::prelude::*` for the common items.

pub use crate::component::{Component, ComponentTag, EntityNodes, NodesRef, component_as};
pub use crate::entity::EntityId;
pub use crate::math::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use crate::registry::Registry;
