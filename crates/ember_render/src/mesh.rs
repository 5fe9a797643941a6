//! Triangle mesh aggregate with its own nested BVH.

use crate::{
    hittable::{Hittable, Intersection, LightSample},
    BvhAccel, Material, Ray, SplitMethod, Triangle,
};
use ember_math::{Aabb, Vec3};
use rand::{Rng, RngCore};
use std::path::Path;
use std::sync::Arc;
use std::{fs, io};
use thiserror::Error;

/// Failure to construct a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read OBJ file: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse OBJ source: {0}")]
    Parse(#[from] wavefront_obj::ParseError),

    #[error("mesh contains no triangles")]
    Empty,
}

/// A triangle mesh.
///
/// The mesh participates in the scene as a single [`Hittable`], but
/// owns an internal BVH over its triangles, so scene-level queries
/// descend through two levels of acceleration.
pub struct TriangleMesh {
    triangles: Vec<Arc<Triangle>>,
    bvh: BvhAccel,
    bounds: Aabb,
    area: f32,
    emissive: bool,
}

impl std::fmt::Debug for TriangleMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleMesh")
            .field("triangles", &self.triangles.len())
            .field("bounds", &self.bounds)
            .field("area", &self.area)
            .field("emissive", &self.emissive)
            .finish_non_exhaustive()
    }
}

impl TriangleMesh {
    /// Build a mesh from a list of triangles.
    pub fn new(triangles: Vec<Triangle>, split_method: SplitMethod) -> Result<Self, MeshError> {
        if triangles.is_empty() {
            return Err(MeshError::Empty);
        }

        let triangles: Vec<Arc<Triangle>> = triangles.into_iter().map(Arc::new).collect();
        let handles: Vec<Arc<dyn Hittable>> = triangles
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn Hittable>)
            .collect();

        let bvh = BvhAccel::new(handles, 1, split_method);
        let bounds = bvh.bounding_box();
        let area = triangles.iter().map(|t| t.area()).sum();
        let emissive = triangles.iter().any(|t| t.is_emissive());

        log::debug!("mesh with {} triangles, area {area:.3}", triangles.len());

        Ok(Self {
            triangles,
            bvh,
            bounds,
            area,
            emissive,
        })
    }

    /// Load a mesh from a Wavefront OBJ file, applying one material to
    /// every face.
    pub fn from_obj(
        path: impl AsRef<Path>,
        material: Arc<Material>,
        split_method: SplitMethod,
    ) -> Result<Self, MeshError> {
        let source = fs::read_to_string(path)?;
        Self::from_obj_source(&source, material, split_method)
    }

    /// Build a mesh from OBJ source text. Non-triangle faces are skipped.
    pub fn from_obj_source(
        source: &str,
        material: Arc<Material>,
        split_method: SplitMethod,
    ) -> Result<Self, MeshError> {
        let parsed = wavefront_obj::obj::parse(source.to_string())?;

        let mut triangles = Vec::new();
        for object in &parsed.objects {
            let vertex = |i: usize| {
                let v = &object.vertices[i];
                Vec3::new(v.x as f32, v.y as f32, v.z as f32)
            };

            for geometry in &object.geometry {
                for shape in &geometry.shapes {
                    let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                        continue;
                    };
                    triangles.push(Triangle::new(
                        vertex(a.0),
                        vertex(b.0),
                        vertex(c.0),
                        Arc::clone(&material),
                    ));
                }
            }
        }

        Self::new(triangles, split_method)
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

impl Hittable for TriangleMesh {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<Intersection<'a>> {
        self.bvh.intersect(ray)
    }

    fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn is_emissive(&self) -> bool {
        self.emissive
    }

    fn sample(&self, rng: &mut dyn RngCore) -> (LightSample, f32) {
        // Pick a triangle in proportion to its area, then sample
        // uniformly within it; the combined density is uniform over
        // the whole mesh surface.
        let target = rng.gen::<f32>() * self.area;
        let mut running = 0.0;
        for triangle in &self.triangles {
            running += triangle.area();
            if target <= running {
                let (sample, _) = triangle.sample(rng);
                return (sample, 1.0 / self.area);
            }
        }

        // Accumulated rounding can leave the draw past the last bucket.
        let (sample, _) = self
            .triangles
            .last()
            .expect("constructor rejects empty meshes")
            .sample(rng);
        (sample, 1.0 / self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const QUAD_OBJ: &str = "\
o quad
v -1.0 -1.0 -3.0
v 1.0 -1.0 -3.0
v 1.0 1.0 -3.0
v -1.0 1.0 -3.0
f 1 2 3
f 1 3 4
";

    fn gray() -> Arc<Material> {
        Arc::new(Material::diffuse(Vec3::splat(0.5)))
    }

    #[test]
    fn test_obj_quad_loads_two_triangles() {
        let mesh = TriangleMesh::from_obj_source(QUAD_OBJ, gray(), SplitMethod::Naive)
            .expect("valid OBJ source");
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.area() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_obj_quad_hit() {
        let mesh = TriangleMesh::from_obj_source(QUAD_OBJ, gray(), SplitMethod::Naive).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.1, 0.1, -1.0).normalize());
        let hit = mesh.hit(&ray).expect("ray into the quad must hit");
        assert!((hit.point.z - (-3.0)).abs() < 1e-4);

        let miss = Ray::new(Vec3::ZERO, Vec3::new(0.1, 0.1, 1.0).normalize());
        assert!(mesh.hit(&miss).is_none());
    }

    #[test]
    fn test_empty_mesh_is_an_error() {
        let err = TriangleMesh::new(Vec::new(), SplitMethod::Naive).unwrap_err();
        assert!(matches!(err, MeshError::Empty));
    }

    #[test]
    fn test_obj_parse_error() {
        let err = TriangleMesh::from_obj_source("not an obj %%", gray(), SplitMethod::Naive)
            .unwrap_err();
        assert!(matches!(err, MeshError::Parse(_)));
    }

    #[test]
    fn test_mesh_sample_on_surface() {
        let mesh = TriangleMesh::from_obj_source(QUAD_OBJ, gray(), SplitMethod::Naive).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let (s, pdf) = mesh.sample(&mut rng);
            assert!((s.point.z - (-3.0)).abs() < 1e-5);
            assert!(s.point.x.abs() <= 1.0 + 1e-5);
            assert!(s.point.y.abs() <= 1.0 + 1e-5);
            assert!((pdf - 1.0 / 8.0).abs() < 1e-6);
        }
    }
}
