//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over primitive handles, built top-down by recursively
//! partitioning the centroid-sorted subset, and traversed recursively
//! with a slab-test prune at every node.

use crate::hittable::{closer, Hittable, Intersection};
use crate::Ray;
use ember_math::Aabb;
use std::sync::Arc;
use std::time::Instant;

/// Number of candidate split planes the SAH scan evaluates per node.
const SAH_PLANE_CANDIDATES: usize = 10;

/// Split-index selection policy for BVH construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMethod {
    /// Partition the centroid-sorted subset at its median.
    #[default]
    Naive,
    /// Surface-area-heuristic approximation: evaluate evenly spaced
    /// candidate planes along the centroid range and keep the one
    /// minimizing the summed surface area of the two halves' bounds.
    Sah,
}

/// BVH node - either a branch with two children or a single-object leaf.
///
/// Each parent exclusively owns its children, so the whole tree is
/// dropped atomically with the root. The tree is immutable after
/// construction.
enum BvhNode {
    /// Internal node with two children and the union of their bounds.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: Aabb,
    },
    /// Leaf holding exactly one object handle and its bounds.
    Leaf {
        object: Arc<dyn Hittable>,
        bounds: Aabb,
    },
    /// Empty tree (built from an empty primitive list).
    Empty,
}

impl BvhNode {
    fn bounds(&self) -> Aabb {
        match self {
            BvhNode::Branch { bounds, .. } | BvhNode::Leaf { bounds, .. } => *bounds,
            BvhNode::Empty => Aabb::EMPTY,
        }
    }

    fn intersect<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { object, bounds } => {
                if !bounds.intersect_p(ray.origin, ray.inv_direction, ray.dir_is_neg, ray.t_max) {
                    return None;
                }
                object.hit(ray)
            }

            BvhNode::Branch { left, right, bounds } => {
                if !bounds.intersect_p(ray.origin, ray.inv_direction, ray.dir_is_neg, ray.t_max) {
                    return None;
                }
                closer(left.intersect(ray), right.intersect(ray))
            }
        }
    }
}

/// BVH over a set of shared primitive handles.
///
/// The structure holds non-owning-in-spirit `Arc` clones of the
/// caller's objects: the scene remains the place primitives are
/// enumerated (e.g. for light sampling), the BVH only accelerates
/// intersection queries against them.
pub struct BvhAccel {
    root: BvhNode,
    split_method: SplitMethod,
    max_prims_in_node: usize,
}

impl BvhAccel {
    /// Build a BVH over `objects`.
    ///
    /// An empty list is not an error: the result is the empty sentinel
    /// and every intersection query reports no hit.
    ///
    /// `max_prims_in_node` is accepted and stored as a leaf-size knob,
    /// but the current splitter always recurses down to single-object
    /// leaves; wiring the cap into the recursion is left to callers
    /// that need shallower trees.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        max_prims_in_node: usize,
        split_method: SplitMethod,
    ) -> Self {
        let start = Instant::now();
        let count = objects.len();

        let root = if objects.is_empty() {
            BvhNode::Empty
        } else {
            Self::build(objects, split_method)
        };

        log::debug!(
            "built {:?} BVH over {} primitives in {:.2?}",
            split_method,
            count,
            start.elapsed()
        );

        Self {
            root,
            split_method,
            max_prims_in_node: max_prims_in_node.min(255),
        }
    }

    /// Nearest intersection among all primitives in the tree.
    pub fn intersect<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>> {
        self.root.intersect(ray)
    }

    /// Bounds of the whole tree; empty for an empty structure.
    pub fn bounding_box(&self) -> Aabb {
        self.root.bounds()
    }

    pub fn split_method(&self) -> SplitMethod {
        self.split_method
    }

    pub fn max_prims_in_node(&self) -> usize {
        self.max_prims_in_node
    }

    /// Recursive top-down construction.
    fn build(mut objects: Vec<Arc<dyn Hittable>>, method: SplitMethod) -> BvhNode {
        let n = objects.len();

        if n == 1 {
            let object = objects.pop().expect("length checked");
            let bounds = object.bounding_box();
            return BvhNode::Leaf { object, bounds };
        }

        if n == 2 {
            // Forced split: one leaf per side, so subtree depth stays
            // logarithmic in the primitive count.
            let right = objects.pop().expect("length checked");
            let left = objects.pop().expect("length checked");
            let left_bounds = left.bounding_box();
            let right_bounds = right.bounding_box();
            return BvhNode::Branch {
                bounds: left_bounds.union(&right_bounds),
                left: Box::new(BvhNode::Leaf {
                    object: left,
                    bounds: left_bounds,
                }),
                right: Box::new(BvhNode::Leaf {
                    object: right,
                    bounds: right_bounds,
                }),
            };
        }

        // The split axis comes from the bounds of the centroids, not of
        // the primitives themselves.
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |mut acc, obj| {
            acc.grow(obj.bounding_box().centroid());
            acc
        });
        let axis = centroid_bounds.max_extent();

        objects.sort_by(|a, b| {
            let ka = a.bounding_box().centroid()[axis];
            let kb = b.bounding_box().centroid()[axis];
            ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = match method {
            SplitMethod::Naive => n / 2,
            SplitMethod::Sah => Self::sah_partition_index(&objects, &centroid_bounds, axis),
        };
        // The cost scan legitimately reports 0 when every candidate
        // plane leaves one side empty (all centroids coincident on the
        // split axis). A one-sided partition cannot recurse down to
        // single-object leaves, so such nodes fall back to the median.
        let mid = if mid == 0 || mid == n { n / 2 } else { mid };

        let right_objects = objects.split_off(mid);
        let left_objects = objects;
        debug_assert_eq!(left_objects.len() + right_objects.len(), n);

        let left = Self::build(left_objects, method);
        let right = Self::build(right_objects, method);
        let bounds = left.bounds().union(&right.bounds());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bounds,
        }
    }

    /// SAH-style partition index for a centroid-sorted subset.
    ///
    /// Scans `SAH_PLANE_CANDIDATES` planes evenly spaced interior to
    /// the centroid range on `axis`; each plane's candidate index is
    /// the first element whose centroid lies beyond it, and its cost
    /// the summed surface area of the two halves' union bounds. This
    /// is only an approximation of a true SAH - it weights by area
    /// alone, not primitive counts.
    fn sah_partition_index(
        objects: &[Arc<dyn Hittable>],
        centroid_bounds: &Aabb,
        axis: usize,
    ) -> usize {
        match objects.len() {
            0 | 1 => 0,
            2 => 1,
            _ => {
                let lo = centroid_bounds.min[axis];
                let hi = centroid_bounds.max[axis];

                let mut best_index = 0;
                let mut best_cost = f32::INFINITY;

                for i in 1..=SAH_PLANE_CANDIDATES {
                    let plane = lo + i as f32 * (hi - lo) / (SAH_PLANE_CANDIDATES + 1) as f32;

                    // First element past the plane; planes with no such
                    // element cannot produce a two-sided partition.
                    let Some(split) = objects
                        .iter()
                        .position(|o| o.bounding_box().centroid()[axis] > plane)
                    else {
                        continue;
                    };

                    let cost = union_bounds(&objects[..split]).surface_area()
                        + union_bounds(&objects[split..]).surface_area();
                    if cost < best_cost {
                        best_index = split;
                        best_cost = cost;
                    }
                }

                best_index
            }
        }
    }
}

fn union_bounds(objects: &[Arc<dyn Hittable>]) -> Aabb {
    objects
        .iter()
        .fold(Aabb::EMPTY, |acc, obj| acc.union(&obj.bounding_box()))
}
