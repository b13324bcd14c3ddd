//! Math types for component payloads.
//!
//! Payloads carry plain value types from [glam](https://docs.rs/glam):
//! vectors, matrices, and quaternions, all stateless and side-effect-free.
//! They are re-exported here so embedders get one import path and don't
//! depend on glam directly.

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
