//! Image buffer, pixel pipeline, and the single-threaded renderer.

use crate::{Camera, Scene};
use ember_math::Vec3;
use rand::RngCore;
use std::path::Path;
use thiserror::Error;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Samples per pixel.
    pub samples_per_pixel: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
        }
    }
}

/// Failure to write a rendered image to disk.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Average `samples_per_pixel` estimator evaluations through one pixel.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let mut pixel_color = Vec3::ZERO;

    for _ in 0..config.samples_per_pixel {
        // get_ray jitters within the pixel, so samples anti-alias
        let ray = camera.get_ray(x, y, rng);
        pixel_color += scene.cast_ray(&ray, 0, rng);
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGBA.
pub fn color_to_rgba(color: Vec3) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Framebuffer of linear radiance values.
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl FrameBuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Vec3) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to gamma-corrected RGBA bytes.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Write the framebuffer to a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let rgba = self.to_rgba();
        image::save_buffer(
            path,
            &rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Render the scene through the camera, pixel by pixel.
///
/// Single-threaded; use [`crate::render_buckets`] for the parallel
/// tiled path.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> FrameBuffer {
    let mut image = FrameBuffer::new(camera.image_width, camera.image_height);

    let start = std::time::Instant::now();
    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }
    log::debug!(
        "rendered {}x{} at {} spp in {:?}",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        start.elapsed()
    );

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, SplitMethod, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-4);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Vec3::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Vec3::splat(10.0)), [255, 255, 255, 255]);
    }

    #[test]
    fn test_framebuffer_round_trip() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.set(3, 1, Vec3::splat(1.0));
        assert_eq!(fb.get(3, 1), Vec3::splat(1.0));
        assert_eq!(fb.get(0, 0), Vec3::ZERO);
        assert_eq!(fb.to_rgba().len(), 4 * 2 * 4);
    }

    #[test]
    fn test_render_lit_sphere_is_not_black() {
        // A diffuse sphere under an emissive sphere, camera looking
        // straight at it: the image center must pick up light.
        let mut scene = Scene::new();
        scene.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Material::diffuse(Vec3::splat(0.7))),
        )));
        scene.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 4.0, -3.0),
            1.0,
            Arc::new(Material::emissive(Vec3::splat(0.7), Vec3::splat(20.0))),
        )));
        scene.build_bvh(SplitMethod::Sah);

        let mut camera = Camera::new()
            .with_resolution(8, 8)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_vfov(60.0);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 8,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let image = render(&camera, &scene, &config, &mut rng);

        assert!(image.get(4, 4).length() > 0.0);
    }
}
