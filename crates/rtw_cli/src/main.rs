//! `rtw`: render a built-in scene through the BVH path tracer and save a PNG.

mod scenes;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rtw_core::ObjOptions;
use rtw_renderer::{render, BuildStats, Bvh, RenderConfig, RenderMode, RenderOutput, Vec3};

use crate::scenes::{SceneKind, SceneOptions};

/// Render a scene with the BVH-accelerated path tracer.
#[derive(Parser, Debug)]
#[command(name = "rtw", version, about)]
struct Cli {
    /// Scene to render
    #[arg(value_enum, default_value_t = SceneKind::Balls)]
    scene: SceneKind,

    /// Output PNG path
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// JSON render config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image width in pixels (scene default if omitted)
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels (scene default if omitted)
    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum number of bounces per path
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Seed for scene placement and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Write BVH box tests per primary ray instead of shaded colour
    #[arg(long)]
    heatmap: bool,

    /// OBJ mesh for the `mesh` scene (also added to `balls`)
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Uniform scale applied to the OBJ vertices
    #[arg(long, default_value_t = 1.0)]
    obj_scale: f32,

    /// Translation applied to the OBJ vertices after scaling, as "x,y,z"
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
    obj_offset: Vec3,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected three comma-separated numbers, got {s:?}")),
    }
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    log::info!("Loaded render config from {}", path.display());
    Ok(config)
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RenderConfig::default(),
        };

        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.heatmap {
            config.mode = RenderMode::Heatmap;
        }
        Ok(config)
    }
}

fn save_png(path: &Path, output: &RenderOutput) -> Result<()> {
    let image = &output.image;
    image::save_buffer(
        path,
        &image.to_rgb8(),
        image.width,
        image.height,
        image::ColorType::Rgb8,
    )
    .with_context(|| format!("failed to write {}", path.display()))
}

fn print_report(
    primitives: usize,
    triangles: usize,
    build: &BuildStats,
    config: &RenderConfig,
    output: &RenderOutput,
) {
    let stats = &output.stats;
    let rows: [(&str, String); 16] = [
        ("Render time (sec)", format!("{:.3}", output.elapsed.as_secs_f64())),
        ("Primitives", primitives.to_string()),
        ("Triangles", triangles.to_string()),
        ("Primary rays", output.primary_rays.to_string()),
        ("Ray-primitive tests", stats.primitive_tests.to_string()),
        ("Ray-primitive intersections", stats.primitive_hits.to_string()),
        ("BVH ray-box tests", stats.box_tests.to_string()),
        ("BVH ray-box intersections", stats.box_hits.to_string()),
        ("BVH leaf visits", stats.leaf_visits.to_string()),
        ("BVH nodes", build.nodes.to_string()),
        ("BVH leaf nodes", build.leaves.to_string()),
        ("BVH depth", build.max_depth.to_string()),
        ("BVH median splits", build.median_splits.to_string()),
        ("Samples per pixel", config.samples_per_pixel.to_string()),
        ("Max ray depth", config.max_depth.to_string()),
        (
            "Image dimensions",
            format!("{}x{}", output.image.width, output.image.height),
        ),
    ];

    println!("Info:");
    for (label, value) in rows {
        println!("  {label:<30}: {value}");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let config = cli.render_config()?;

    let options = SceneOptions {
        obj: cli.obj.as_deref(),
        obj_options: ObjOptions::new(cli.obj_scale, cli.obj_offset),
        seed: config.seed,
    };
    let scene = scenes::build(cli.scene, &options)?;

    let width = cli.width.unwrap_or(scene.camera.image_width);
    let height = cli.height.unwrap_or(scene.camera.image_height);
    let mut camera = scene.camera.with_resolution(width, height);
    camera.initialize();

    let primitives = scene.objects.len();
    let world = Bvh::from_list(scene.objects);
    let build = world.build_stats();

    let output = render(&camera, &world, &config);
    save_png(&cli.output, &output)?;
    log::info!("Saved {}", cli.output.display());

    print_report(primitives, scene.triangles, &build, &config, &output);
    Ok(())
}
