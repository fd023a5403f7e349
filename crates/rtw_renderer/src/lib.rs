//! rtw Renderer - BVH-accelerated CPU path tracing.
//!
//! The heart of the crate is [`Bvh`]: a binary bounding volume hierarchy
//! built top-down with binned SAH splits and traversed near-child-first.
//! Around it sit the pieces a path tracer needs: primitives
//! ([`Sphere`], [`Triangle`]), [`Material`]s, a [`Camera`], the recursive
//! [`ray_color`] integrator and a bucket renderer that runs on rayon.
//!
//! A built [`Bvh`] is itself [`Hittable`], so callers never need to tell a
//! tree apart from a single primitive.

mod bucket;
mod bvh;
mod camera;
mod color;
mod hittable;
mod material;
mod renderer;
mod sampling;
mod sphere;
pub mod stats;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{build_acceleration_structure, BuildStats, Bvh, BvhNode, BIN_COUNT};
pub use camera::Camera;
pub use color::{color_to_rgb8, inferno, linear_to_gamma};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{
    ray_color, render, render_pixel, ImageBuffer, RenderConfig, RenderMode, RenderOutput,
    HIT_EPSILON,
};
pub use sphere::Sphere;
pub use stats::RayStats;
pub use triangle::{mesh_triangles, Triangle};

/// Re-export Vec3 and common math types from rtw_math
pub use rtw_math::{Aabb, Interval, Ray, Vec3};
