//! Ember - CPU Path Tracing
//!
//! A Monte Carlo path tracer over a BVH-accelerated scene: diffuse
//! surfaces, area lights sampled by surface area, and Russian-roulette
//! path termination.

mod ray;
mod hittable;
mod material;
mod sphere;
mod triangle;
mod mesh;
mod camera;
mod bvh;
mod scene;
mod renderer;
mod bucket;

pub use ray::Ray;
pub use hittable::{Hittable, Intersection, LightSample};
pub use material::{Material, MaterialKind};
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use mesh::{MeshError, TriangleMesh};
pub use camera::Camera;
pub use bvh::{BvhAccel, SplitMethod};
pub use scene::Scene;
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_pixel, FrameBuffer, ImageError, RenderConfig,
};
pub use bucket::{
    generate_buckets, render_bucket, render_buckets, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Vec3};
