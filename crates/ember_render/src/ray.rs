use ember_math::Vec3;

/// A ray with precomputed reciprocal direction for slab tests.
///
/// The reciprocal avoids per-node divisions during BVH traversal, and
/// the per-axis sign triple selects near/far slabs without branching on
/// computed distances.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Componentwise `1 / direction`.
    pub inv_direction: Vec3,
    /// Per-axis sign of the direction (`true` where negative).
    pub dir_is_neg: [bool; 3],
    /// Upper bound on the hit parameter; `INFINITY` for unbounded rays.
    pub t_max: f32,
}

impl Ray {
    /// Create an unbounded ray.
    ///
    /// The direction must have no zero components: the reciprocal of a
    /// zero component is infinite and the slab test's behavior for such
    /// rays is undefined. Callers supply a non-degenerate direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_t_max(origin, direction, f32::INFINITY)
    }

    /// Create a ray whose hits beyond `t_max` are ignored.
    pub fn with_t_max(origin: Vec3, direction: Vec3, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            inv_direction: Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z),
            dir_is_neg: [direction.x < 0.0, direction.y < 0.0, direction.z < 0.0],
            t_max,
        }
    }

    /// The point along the ray at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
