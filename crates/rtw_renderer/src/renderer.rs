//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard bounce limit
//! - Anti-aliasing via jittered multi-sampling
//! - Parallel bucket rendering on rayon
//! - A BVH cost heatmap mode for inspecting the acceleration structure

use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::color::{color_to_rgb8, inferno};
use crate::stats::{self, RayStats};
use crate::{Camera, Color, Hittable, Ray};
use rand::RngCore;
use rayon::prelude::*;
use rtw_math::Interval;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Lower bound of the hit interval for every traced ray, so a scattered ray
/// does not hit the surface it leaves from.
pub const HIT_EPSILON: f32 = 0.001;

/// What a render writes into the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Path traced colour
    #[default]
    Shaded,
    /// BVH nodes entered per primary ray, mapped through the inferno
    /// palette. Boxes the ray was tested against but missed do not count.
    Heatmap,
}

/// Render configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Edge length of the square render buckets in pixels
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
    pub mode: RenderMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            max_depth: 10,
            background: Color::ZERO,
            use_sky_gradient: false,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            mode: RenderMode::Shaded,
        }
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color, and stops after
/// `depth` bounces.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // Bounce budget exhausted, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::from_min(HIT_EPSILON)) else {
        return background(ray, config);
    };

    let emission = rec.material.emitted();

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth - 1, config, rng);
            emission + result.attenuation * scattered_color
        }
        // Absorbed, or a pure emitter
        None => emission,
    }
}

fn background(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
///
/// In [`RenderMode::Heatmap`] the result is the average number of BVH boxes
/// the primary rays entered, stored in every channel.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += match config.mode {
            RenderMode::Shaded => ray_color(&ray, world, config.max_depth, config, rng),
            RenderMode::Heatmap => {
                let (_, counters) = stats::measure(|| world.hit(&ray, Interval::from_min(HIT_EPSILON)).is_some());
                Color::splat(counters.box_hits as f32)
            }
        };
    }

    pixel_color / samples as f32
}

/// Linear color image in row-major order, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket (row-major pixels) into place.
    pub fn write_bucket(&mut self, bucket: &Bucket, pixels: &[Color]) {
        let width = bucket.width as usize;
        for (row, line) in pixels.chunks(width).enumerate().take(bucket.height as usize) {
            let start = ((bucket.y + row as u32) * self.width + bucket.x) as usize;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
    }

    /// Normalize by the largest value and map through the inferno palette.
    ///
    /// Returns the maximum before normalization.
    pub fn apply_heatmap(&mut self) -> f32 {
        let max = self.pixels.iter().fold(0.0f32, |m, p| m.max(p.x));
        let scale = if max > 0.0 { 1.0 / max } else { 0.0 };
        for p in &mut self.pixels {
            *p = inferno(p.x * scale);
        }
        max
    }

    /// Gamma-encoded RGB bytes (3 per pixel), ready to be saved.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }
}

/// Everything a finished render produced.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub image: ImageBuffer,
    /// Ray query counters summed over all buckets
    pub stats: RayStats,
    pub primary_rays: u64,
    pub elapsed: Duration,
}

/// Render the entire scene, buckets in parallel.
///
/// Output only depends on the scene, camera and config (including the seed),
/// not on how rayon schedules the buckets.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> RenderOutput {
    let start = Instant::now();
    let (width, height) = (camera.image_width, camera.image_height);
    let buckets = generate_buckets(width, height, config.bucket_size);

    log::info!(
        "Rendering {}x{} in {} buckets, {} spp, max depth {}, {:?} mode",
        width,
        height,
        buckets.len(),
        config.samples_per_pixel,
        config.max_depth,
        config.mode
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, world, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(&result.bucket, &result.pixels);
    }
    let stats: RayStats = results.iter().map(|r| r.stats).sum();

    if config.mode == RenderMode::Heatmap {
        let max = image.apply_heatmap();
        log::info!("Heatmap: max {:.1} nodes entered per primary ray", max);
    }

    let elapsed = start.elapsed();
    log::info!("Render finished in {:.2?}", elapsed);

    RenderOutput {
        image,
        stats,
        primary_rays: width as u64 * height as u64 * config.samples_per_pixel.max(1) as u64,
        elapsed,
    }
}
