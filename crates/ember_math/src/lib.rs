//! Ember math - geometric foundation for the path tracing core.
//!
//! Re-exports `glam` for vector types and adds the axis-aligned
//! bounding box used by the BVH.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
pub use aabb::Aabb;
