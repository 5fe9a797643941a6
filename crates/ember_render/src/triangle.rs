//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{Hittable, Intersection, LightSample},
    Material, Ray,
};
use ember_math::{Aabb, Vec3};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// A triangle primitive with a precomputed face normal.
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Unit face normal.
    normal: Vec3,
    /// Half the cross-product magnitude of the edges.
    area: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(edge2);

        let bbox = Aabb::from_point(v0)
            .union(&Aabb::from_point(v1))
            .union(&Aabb::from_point(v2));

        Self {
            v0,
            v1,
            v2,
            normal: cross.normalize(),
            area: cross.length() * 0.5,
            material,
            bbox,
        }
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection.
    fn hit<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray parallel to the triangle plane
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t <= 0.0 || t >= ray.t_max {
            return None;
        }

        Some(Intersection {
            point: ray.at(t),
            normal: self.normal,
            t,
            emission: self.material.emission(),
            material: &self.material,
            object: self,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn is_emissive(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (LightSample, f32) {
        // sqrt-barycentric mapping gives a uniform distribution over
        // the triangle surface.
        let su = (rng.gen::<f32>()).sqrt();
        let v: f32 = rng.gen();
        let point = self.v0 * (1.0 - su) + self.v1 * (su * (1.0 - v)) + self.v2 * (su * v);

        let sample = LightSample {
            point,
            normal: self.normal,
            emission: self.material.emission(),
        };
        (sample, 1.0 / self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Arc::new(Material::diffuse(Vec3::splat(0.5))),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = test_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = tri.hit(&ray).expect("ray at the centroid must hit");
        assert!((hit.t - 1.0).abs() < 1e-4);
        assert!((hit.normal.z.abs() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = test_triangle();

        // Outside the triangle but inside its plane's bounds.
        let off = Ray::new(Vec3::new(0.9, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&off).is_none());

        // Pointing away.
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.hit(&away).is_none());
    }

    #[test]
    fn test_triangle_area() {
        // Base 2, height 2 => area 2.
        let tri = test_triangle();
        assert!((tri.area() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_sample_on_surface() {
        let tri = test_triangle();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let (s, pdf) = tri.sample(&mut rng);
            // On the supporting plane...
            assert!((s.point.z - (-1.0)).abs() < 1e-5);
            // ...and inside the triangle's bounds.
            assert!(tri.bounding_box().contains(s.point));
            assert!((pdf - 1.0 / tri.area()).abs() < 1e-7);
        }
    }
}
