//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{
    hittable::{HitRecord, Hittable},
    stats, Material, Ray,
};
use rtw_core::Mesh;
use rtw_math::{Aabb, Interval, Vec3};

/// Determinant magnitude below which a ray is treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-5;

/// Minimum box thickness per axis, so flat triangles still have a volume.
const MIN_BOX_EXTENT: f32 = 1e-5;

/// A triangle primitive.
pub struct Triangle<M: Material> {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, zero for degenerate triangles)
    normal: Vec3,
    /// Mean of the three vertices
    centroid: Vec3,
    /// Material
    material: M,
    /// Bounding box
    bbox: Aabb,
}

impl<M: Material> Triangle<M> {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: M) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
            .pad_to_minimum(MIN_BOX_EXTENT);

        Self {
            v0,
            v1,
            v2,
            normal,
            centroid: (v0 + v1 + v2) / 3.0,
            material,
            bbox,
        }
    }

    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to triangle
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, &self.material))
    }
}

impl<M: Material + 'static> Hittable for Triangle<M> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let hit = self.intersect(ray, ray_t);
        stats::primitive_test(hit.is_some());
        hit
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn centroid(&self) -> Vec3 {
        self.centroid
    }
}

/// Turn every triangle of `mesh` into a boxed primitive sharing `material`.
pub fn mesh_triangles<M>(mesh: &Mesh, material: M) -> Vec<Box<dyn Hittable>>
where
    M: Material + Clone + 'static,
{
    mesh.triangles()
        .into_iter()
        .map(|[a, b, c]| Box::new(Triangle::new(a, b, c, material.clone())) as Box<dyn Hittable>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;

    fn xy_triangle(z: f32) -> Triangle<Lambertian> {
        Triangle::new(
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
            Lambertian::new(Vec3::new(0.5, 0.5, 0.5)),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let rec = tri.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle(-1.0);

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(tri.hit(&ray, Interval::from_min(0.001)).is_none());

        // Outside the edges
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tri.hit(&ray, Interval::from_min(0.001)).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.hit(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_back_face_flips_normal() {
        let tri = xy_triangle(-1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);

        let rec = tri.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }

    #[test]
    fn test_flat_triangle_box_is_padded() {
        let tri = xy_triangle(-1.0);
        let bbox = tri.bounding_box();
        assert!(bbox.max.z > bbox.min.z);
        assert!(bbox.min.z <= -1.0 && bbox.max.z >= -1.0);
        assert!((tri.centroid() - Vec3::new(0.0, -1.0 / 3.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_mesh_triangles() {
        let mesh = Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );

        let prims = mesh_triangles(&mesh, Lambertian::new(Vec3::ONE));
        assert_eq!(prims.len(), 2);
        assert!(prims[0].bounding_box().contains_box(&Aabb::from_points(
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 0.0)
        )));
    }
}
