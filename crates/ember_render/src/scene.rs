//! Scene ownership and the recursive Monte Carlo path tracer.

use crate::hittable::{Hittable, Intersection, LightSample};
use crate::{BvhAccel, Ray, SplitMethod};
use ember_math::Vec3;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// The scene: the object list, its acceleration structure, and the
/// estimator's tuning knobs.
///
/// Objects are shared handles; the scene is the authoritative list
/// (light sampling walks it), the BVH only accelerates intersection.
pub struct Scene {
    objects: Vec<Arc<dyn Hittable>>,
    bvh: Option<BvhAccel>,
    /// Russian-roulette continuation probability, in `(0, 1]`. The
    /// closer to 1, the longer the average path (and the deeper the
    /// recursion).
    pub russian_roulette: f32,
    /// Offset applied along the surface normal when spawning secondary
    /// rays, and 1/10 of the shadow-ray interposition tolerance. Must
    /// scale with the scene's units: too small self-shadows, too large
    /// leaks light.
    pub shadow_epsilon: f32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bvh: None,
            russian_roulette: 0.8,
            shadow_epsilon: 1e-4,
        }
    }

    /// Add an object. Invalidates any previously built BVH.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
        self.bvh = None;
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Build the acceleration structure over the current object list.
    pub fn build_bvh(&mut self, split_method: SplitMethod) {
        log::info!(
            "building scene BVH over {} objects ({split_method:?} split)",
            self.objects.len()
        );
        self.bvh = Some(BvhAccel::new(self.objects.clone(), 1, split_method));
    }

    /// Nearest intersection with the scene.
    ///
    /// An empty or not-yet-built scene reports no hit rather than
    /// failing; callers that need geometry must check.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.bvh.as_ref().and_then(|bvh| bvh.intersect(ray))
    }

    /// Sample a point on the aggregate light surface, selecting a light
    /// in proportion to its area.
    ///
    /// Two passes over the object list: sum the emissive areas, then
    /// re-walk accumulating until the scaled draw is crossed. No light
    /// list or CDF is cached, so every call costs one walk of the
    /// objects. Returns `None` when the scene has no emissive surface
    /// (the caller skips direct lighting).
    fn sample_light(&self, rng: &mut dyn RngCore) -> Option<(LightSample, f32)> {
        let emit_area_sum: f32 = self
            .objects
            .iter()
            .filter(|o| o.is_emissive())
            .map(|o| o.area())
            .sum();
        if emit_area_sum <= 0.0 {
            return None;
        }

        let target = rng.gen::<f32>() * emit_area_sum;
        let mut running = 0.0;
        for object in &self.objects {
            if object.is_emissive() {
                running += object.area();
                if target <= running {
                    return Some(object.sample(rng));
                }
            }
        }

        // Rounding in the running sum can leave the draw past the last
        // bucket; skip direct lighting for this sample.
        None
    }

    /// Recursive unidirectional path-tracing estimator.
    ///
    /// Returns the radiance arriving along `ray`. `depth` is purely
    /// diagnostic - termination is stochastic via the Russian-roulette
    /// continuation probability, not depth-bounded.
    pub fn cast_ray(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Vec3 {
        let Some(hit) = self.intersect(ray) else {
            return Vec3::ZERO;
        };
        log::trace!("cast_ray depth {depth} hit t={}", hit.t);

        let p = hit.point;
        let n = hit.normal.normalize();
        let material = hit.material;
        let wo = -ray.direction;

        // The ray landed on a light source.
        let emitted = if material.has_emission() {
            material.emission()
        } else {
            Vec3::ZERO
        };

        // Direct lighting from one area-weighted light sample.
        let mut direct = Vec3::ZERO;
        if let Some((light, pdf_light)) = self.sample_light(rng) {
            let x = light.point;

            // Offset the shading point to whichever side faces the
            // light, so the shadow ray cannot re-hit its own surface.
            let shaded_p = if (x - p).dot(n) < 0.0 {
                p - n * self.shadow_epsilon
            } else {
                p + n * self.shadow_epsilon
            };
            let to_light = x - shaded_p;
            let distance = to_light.length();
            let ws = to_light / distance;

            let shadow_ray = Ray::new(shaded_p, ws);
            let nearest = self
                .intersect(&shadow_ray)
                .map_or(f32::INFINITY, |s| s.t);

            // Interposition is a distance-tolerance test, not an
            // object-identity test: anything between the point and the
            // light pulls the nearest hit below the known distance.
            let blocked = (nearest - distance).abs() >= self.shadow_epsilon * 10.0;

            if !blocked && pdf_light > 0.0 {
                direct = light.emission
                    * material.eval(wo, ws, n)
                    * ws.dot(n)
                    * (-ws).dot(light.normal)
                    / (distance * distance)
                    / pdf_light;
            }
        }

        // Indirect lighting, continued with probability
        // `russian_roulette`; surviving samples are divided by it to
        // stay unbiased.
        let mut indirect = Vec3::ZERO;
        if rng.gen::<f32>() < self.russian_roulette {
            let wi = material.sample(wo, n, rng).normalize();
            let origin = if wi.dot(n) < 0.0 {
                p - n * self.shadow_epsilon
            } else {
                p + n * self.shadow_epsilon
            };
            let bounce = Ray::new(origin, wi);

            // Only bounces onto non-emissive surfaces contribute here;
            // light seen directly is already handled by the direct term.
            if let Some(bounce_hit) = self.intersect(&bounce) {
                if !bounce_hit.material.has_emission() {
                    let pdf = material.pdf(wo, wi, n);
                    if pdf > 0.0 {
                        let incoming = self.cast_ray(&bounce, depth + 1, rng);
                        indirect = incoming * material.eval(wo, wi, n) * wi.dot(n)
                            / pdf
                            / self.russian_roulette;
                    }
                }
            }
        }

        emitted + direct + indirect
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
