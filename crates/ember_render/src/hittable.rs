//! Hittable capability set and intersection records.

use crate::{Material, Ray};
use ember_math::{Aabb, Vec3};
use rand::RngCore;

/// Result of a ray-object intersection query.
///
/// Constructed fresh per query and never pooled; `material` and
/// `object` are non-owning back-references into the scene. The "no
/// hit" sentinel is `None` at the query boundary - call sites that
/// need the classic distance-of-infinity behavior fold the `Option`
/// with `f32::INFINITY`.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// World-space hit point.
    pub point: Vec3,
    /// Surface normal at the hit point (unit length).
    pub normal: Vec3,
    /// Hit distance along the ray.
    pub t: f32,
    /// Radiance emitted at the point, zero for non-lights.
    pub emission: Vec3,
    /// Material of the hit surface.
    pub material: &'a Material,
    /// The primitive that produced the hit.
    pub object: &'a dyn Hittable,
}

/// A point sampled on an emissive surface, with its normal and radiance.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub point: Vec3,
    pub normal: Vec3,
    pub emission: Vec3,
}

/// Capability set every renderable primitive or aggregate implements.
///
/// `Send + Sync` so scenes can be shared across render workers; the
/// primitives themselves are immutable once built.
pub trait Hittable: Send + Sync {
    /// Exact nearest intersection with the ray in `(0, ray.t_max)`.
    fn hit<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>>;

    /// Axis-aligned bounds enclosing the primitive.
    fn bounding_box(&self) -> Aabb;

    /// Total surface area, used for area-proportional light selection.
    fn area(&self) -> f32;

    /// True if the surface emits light.
    fn is_emissive(&self) -> bool;

    /// Uniform sample of a point on the surface.
    ///
    /// Returns the sample and its pdf in area measure (`1 / area`).
    fn sample(&self, rng: &mut dyn RngCore) -> (LightSample, f32);
}

/// The closer of two optional hits; `a` wins ties.
pub(crate) fn closer<'a>(
    a: Option<Intersection<'a>>,
    b: Option<Intersection<'a>>,
) -> Option<Intersection<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => {
            if b.t < a.t {
                Some(b)
            } else {
                Some(a)
            }
        }
        (hit, None) | (None, hit) => hit,
    }
}
