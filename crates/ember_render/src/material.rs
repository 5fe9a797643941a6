//! Surface materials: BRDF evaluation, importance sampling and emission.

use ember_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::{FRAC_1_PI, PI};

/// The closed set of supported BRDF models.
///
/// A tagged struct instead of trait objects: the variant set is known,
/// and dispatch stays a plain `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Lambertian diffuse reflection.
    Diffuse,
}

/// A surface material: reflectance model, albedo and emitted radiance.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    /// Diffuse reflectance (RGB, 0-1).
    pub albedo: Vec3,
    /// Emitted radiance; zero for non-lights.
    pub emission: Vec3,
}

impl Material {
    /// A diffuse, non-emissive material.
    pub fn diffuse(albedo: Vec3) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            albedo,
            emission: Vec3::ZERO,
        }
    }

    /// A diffuse light source.
    pub fn emissive(albedo: Vec3, emission: Vec3) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            albedo,
            emission,
        }
    }

    /// True if this material emits light.
    pub fn has_emission(&self) -> bool {
        self.emission.length_squared() > 0.0
    }

    /// Emitted radiance.
    pub fn emission(&self) -> Vec3 {
        self.emission
    }

    /// Evaluate the BRDF for outgoing `wo`, incoming `wi` and normal `n`.
    pub fn eval(&self, _wo: Vec3, wi: Vec3, n: Vec3) -> Vec3 {
        match self.kind {
            MaterialKind::Diffuse => {
                if n.dot(wi) > 0.0 {
                    self.albedo * FRAC_1_PI
                } else {
                    Vec3::ZERO
                }
            }
        }
    }

    /// Importance-sample an incoming direction for the BRDF.
    pub fn sample(&self, _wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self.kind {
            MaterialKind::Diffuse => {
                // Uniform hemisphere about the normal.
                let u1: f32 = rng.gen();
                let u2: f32 = rng.gen();
                let z = (1.0 - 2.0 * u1).abs();
                let r = (1.0 - z * z).max(0.0).sqrt();
                let phi = 2.0 * PI * u2;
                let local = Vec3::new(r * phi.cos(), r * phi.sin(), z);
                to_world(local, n)
            }
        }
    }

    /// Pdf of `sample` having produced `wi` (solid-angle measure).
    pub fn pdf(&self, _wo: Vec3, wi: Vec3, n: Vec3) -> f32 {
        match self.kind {
            MaterialKind::Diffuse => {
                if n.dot(wi) > 0.0 {
                    0.5 * FRAC_1_PI
                } else {
                    0.0
                }
            }
        }
    }
}

/// Rotate a local direction (z up) into the frame of normal `n`.
fn to_world(local: Vec3, n: Vec3) -> Vec3 {
    let c = if n.x.abs() > n.y.abs() {
        let inv_len = 1.0 / (n.x * n.x + n.z * n.z).sqrt();
        Vec3::new(n.z * inv_len, 0.0, -n.x * inv_len)
    } else {
        let inv_len = 1.0 / (n.y * n.y + n.z * n.z).sqrt();
        Vec3::new(0.0, n.z * inv_len, -n.y * inv_len)
    };
    let b = c.cross(n);
    local.x * b + local.y * c + local.z * n
}
