//! Sphere primitive.

use crate::{
    hittable::{Hittable, Intersection, LightSample},
    Material, Ray,
};
use ember_math::{Aabb, Vec3};
use rand::{Rng, RngCore};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::new(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root in (0, t_max)
        let mut root = (h - sqrtd) / a;
        if root <= 0.0 || root >= ray.t_max {
            root = (h + sqrtd) / a;
            if root <= 0.0 || root >= ray.t_max {
                return None;
            }
        }

        let point = ray.at(root);
        Some(Intersection {
            point,
            normal: (point - self.center) / self.radius,
            t: root,
            emission: self.material.emission(),
            material: &self.material,
            object: self,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn is_emissive(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (LightSample, f32) {
        // Uniform direction on the unit sphere.
        let u1: f32 = rng.gen();
        let u2: f32 = rng.gen();
        let z = 1.0 - 2.0 * u1;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * u2;
        let dir = Vec3::new(r * phi.cos(), r * phi.sin(), z);

        let sample = LightSample {
            point: self.center + self.radius * dir,
            normal: dir,
            emission: self.material.emission(),
        };
        (sample, 1.0 / self.area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn unit_sphere() -> Sphere {
        Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            0.5,
            Arc::new(Material::diffuse(Vec3::splat(0.5))),
        )
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = sphere.hit(&ray).expect("ray through center must hit");
        assert!((hit.t - 1.5).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_sphere_miss_and_behind() {
        let sphere = unit_sphere();

        let miss = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.001));
        assert!(sphere.hit(&miss).is_none());

        // Sphere entirely behind the origin.
        let behind = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.001, 1.0));
        assert!(sphere.hit(&behind).is_none());
    }

    #[test]
    fn test_sphere_hit_respects_t_max() {
        let sphere = unit_sphere();
        let ray = Ray::with_t_max(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(sphere.hit(&ray).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = sphere.hit(&ray).expect("interior origin still hits the shell");
        assert!((hit.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_area_and_sample() {
        let sphere = unit_sphere();
        assert!((sphere.area() - 4.0 * PI * 0.25).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let (s, pdf) = sphere.sample(&mut rng);
            let to_center = s.point - Vec3::new(0.0, 0.0, -2.0);
            assert!((to_center.length() - 0.5).abs() < 1e-4);
            assert!((s.normal - to_center.normalize()).length() < 1e-4);
            assert!((pdf - 1.0 / sphere.area()).abs() < 1e-7);
        }
    }
}
