use glam::Vec3;

/// Axis-aligned bounding box for spatial acceleration structures (BVH).
///
/// Defined by its `min` and `max` corners. The default box is *empty*
/// (`min = +INF`, `max = -INF`), which makes it the identity under
/// [`Aabb::union`] and a safe seed for folding bounds over a list.
/// Seeding such a fold with an all-zero box instead would silently
/// corrupt geometry with negative coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// The empty box - identity under union, contains nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new AABB from its two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB containing a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Create an AABB spanning two arbitrary points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The smallest box containing both `self` and `other`.
    ///
    /// Commutative and associative; `Aabb::EMPTY` is the identity.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to contain a point.
    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// True if the box contains nothing (any `min > max` axis).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extent of the box along each axis, clamped to zero for
    /// empty/degenerate boxes.
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }

    /// Center point of the box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Surface area of the box: `2*(dx*dy + dy*dz + dz*dx)`.
    ///
    /// Non-negative even for degenerate (zero-extent) or empty boxes;
    /// used as the cost proxy for SAH-style split selection.
    pub fn surface_area(&self) -> f32 {
        let d = self.extent();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Index (0=X, 1=Y, 2=Z) of the axis with the greatest extent.
    ///
    /// Ties resolve to the lowest axis index: the scan keeps the first
    /// axis achieving the maximum under a strict `>` comparison.
    pub fn max_extent(&self) -> usize {
        let d = self.extent();
        let mut axis = 0;
        let mut best = d.x;
        if d.y > best {
            axis = 1;
            best = d.y;
        }
        if d.z > best {
            axis = 2;
        }
        axis
    }

    /// True if the point lies inside the box (inclusive).
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab-test ray-box intersection predicate.
    ///
    /// `inv_dir` is the ray's precomputed reciprocal direction and
    /// `dir_is_neg` its per-axis sign triple; the sign selects the near
    /// and far slab for each axis instead of branching on the computed
    /// distances. The box is rejected once the running `[t_enter,
    /// t_exit]` interval empties, falls entirely behind the ray origin,
    /// or starts beyond `t_max`.
    ///
    /// Zero direction components produce an infinite `inv_dir` and are
    /// the caller's precondition to avoid (see `Ray::new`).
    pub fn intersect_p(
        &self,
        origin: Vec3,
        inv_dir: Vec3,
        dir_is_neg: [bool; 3],
        t_max: f32,
    ) -> bool {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let (near, far) = if dir_is_neg[axis] {
                (self.max[axis], self.min[axis])
            } else {
                (self.min[axis], self.max[axis])
            };
            let t0 = (near - origin[axis]) * inv_dir[axis];
            let t1 = (far - origin[axis]) * inv_dir[axis];
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
        }

        t_enter <= t_exit && t_exit >= 0.0 && t_enter <= t_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(d: Vec3) -> Vec3 {
        Vec3::new(1.0 / d.x, 1.0 / d.y, 1.0 / d.z)
    }

    fn neg(d: Vec3) -> [bool; 3] {
        [d.x < 0.0, d.y < 0.0, d.z < 0.0]
    }

    #[test]
    fn test_union_commutative_associative() {
        let a = Aabb::from_points(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 5.0));
        let b = Aabb::from_points(Vec3::new(-4.0, -2.0, 0.0), Vec3::new(0.0, 4.0, 1.0));
        let c = Aabb::from_points(Vec3::new(2.0, 2.0, 2.0), Vec3::new(6.0, 6.0, 6.0));

        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
    }

    #[test]
    fn test_union_identity_with_negative_geometry() {
        // The empty box must not bias a fold; an all-zero seed would
        // drag the max corner of fully-negative geometry up to zero.
        let negative = Aabb::from_points(Vec3::splat(-5.0), Vec3::splat(-2.0));
        assert_eq!(Aabb::EMPTY.union(&negative), negative);
        assert_eq!(negative.union(&Aabb::EMPTY), negative);

        let zero_seeded = Aabb::from_point(Vec3::ZERO).union(&negative);
        assert_ne!(zero_seeded, negative);
    }

    #[test]
    fn test_union_tightly_bounds_inputs() {
        let boxes = [
            Aabb::from_points(Vec3::new(-3.0, 1.0, 0.0), Vec3::new(-1.0, 2.0, 4.0)),
            Aabb::from_points(Vec3::new(0.0, -5.0, -1.0), Vec3::new(2.0, 0.0, 0.0)),
            Aabb::from_points(Vec3::new(7.0, 7.0, 7.0), Vec3::new(8.0, 9.0, 8.0)),
        ];
        let total = boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));
        for b in &boxes {
            assert!(total.contains(b.min), "{b:?} min outside {total:?}");
            assert!(total.contains(b.max), "{b:?} max outside {total:?}");
        }
    }

    #[test]
    fn test_surface_area() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.surface_area(), 2.0 * (2.0 + 6.0 + 3.0));

        // Degenerate and empty boxes still report a well-defined area.
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(flat.surface_area(), 12.0);
        assert_eq!(Aabb::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn test_max_extent() {
        let x = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(x.max_extent(), 0);
        let y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(y.max_extent(), 1);
        let z = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(z.max_extent(), 2);
    }

    #[test]
    fn test_max_extent_tie_breaks_low() {
        let cube = Aabb::from_points(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(cube.max_extent(), 0);
        let yz = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 5.0, 5.0));
        assert_eq!(yz.max_extent(), 1);
    }

    #[test]
    fn test_intersect_p_hit_and_miss() {
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Straight through the center.
        let d = Vec3::new(0.2, 0.1, 1.0).normalize();
        assert!(b.intersect_p(Vec3::new(0.0, 0.0, -5.0), inv(d), neg(d), f32::INFINITY));

        // Pointing away: box entirely behind the origin.
        let back = -d;
        assert!(!b.intersect_p(Vec3::new(0.0, 0.0, -5.0), inv(back), neg(back), f32::INFINITY));

        // Offset to the side.
        assert!(!b.intersect_p(Vec3::new(5.0, 0.0, -5.0), inv(d), neg(d), f32::INFINITY));

        // Hit against a negative direction, selecting the far slabs.
        let dn = Vec3::new(0.0, 0.0, -1.0);
        assert!(b.intersect_p(Vec3::new(0.0, 0.0, 5.0), inv(dn), neg(dn), f32::INFINITY));
    }

    #[test]
    fn test_intersect_p_respects_t_max() {
        let b = Aabb::from_points(Vec3::new(-1.0, -1.0, 9.0), Vec3::new(1.0, 1.0, 11.0));
        let d = Vec3::new(0.0, 0.0, 1.0);
        assert!(b.intersect_p(Vec3::ZERO, inv(d), neg(d), f32::INFINITY));
        assert!(!b.intersect_p(Vec3::ZERO, inv(d), neg(d), 5.0));
    }

    #[test]
    fn test_intersect_p_origin_inside() {
        let b = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let d = Vec3::new(1.0, 1.0, 1.0).normalize();
        assert!(b.intersect_p(Vec3::ZERO, inv(d), neg(d), f32::INFINITY));
    }

    #[test]
    fn test_centroid_and_extent() {
        let b = Aabb::from_points(Vec3::new(0.0, 2.0, -4.0), Vec3::new(2.0, 6.0, 0.0));
        assert_eq!(b.centroid(), Vec3::new(1.0, 4.0, -2.0));
        assert_eq!(b.extent(), Vec3::new(2.0, 4.0, 4.0));
        assert!(!b.is_empty());
        assert!(Aabb::EMPTY.is_empty());
    }
}
