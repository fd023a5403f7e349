//! Built-in scenes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtw_core::{load_obj, Mesh, ObjOptions};
use rtw_renderer::{
    mesh_triangles, Camera, Color, Dielectric, DiffuseLight, HittableList, Lambertian, Metal,
    Sphere, Vec3,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Random small spheres around four large ones, lit by four spheres
    Balls,
    /// Procedural height field of triangles
    Grid,
    /// A user supplied OBJ mesh next to two metal spheres
    Mesh,
}

/// Inputs shared by all scene builders.
#[derive(Debug, Clone)]
pub struct SceneOptions<'a> {
    /// Optional OBJ file; required by [`SceneKind::Mesh`], added to `balls`
    pub obj: Option<&'a Path>,
    pub obj_options: ObjOptions,
    /// Seed for the random placement in `balls`
    pub seed: u64,
}

/// Geometry plus the camera that frames it.
pub struct Scene {
    pub objects: HittableList,
    /// Camera with its default resolution; not yet initialized
    pub camera: Camera,
    pub triangles: usize,
}

impl Scene {
    fn new(camera: Camera) -> Self {
        Self {
            objects: HittableList::new(),
            camera,
            triangles: 0,
        }
    }

    fn add_mesh(&mut self, mesh: &Mesh, material: Lambertian) {
        self.triangles += mesh.triangle_count();
        for triangle in mesh_triangles(mesh, material) {
            self.objects.add(triangle);
        }
    }
}

pub fn build(kind: SceneKind, options: &SceneOptions) -> Result<Scene> {
    let scene = match kind {
        SceneKind::Balls => balls(options)?,
        SceneKind::Grid => grid(),
        SceneKind::Mesh => mesh(options)?,
    };
    log::info!(
        "Scene {:?}: {} objects, {} triangles",
        kind,
        scene.objects.len(),
        scene.triangles
    );
    Ok(scene)
}

fn load_mesh(path: &Path, options: &ObjOptions) -> Result<Mesh> {
    load_obj(path, options).with_context(|| format!("failed to load mesh {}", path.display()))
}

fn random_color(rng: &mut StdRng, min: f32, max: f32) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

fn balls(options: &SceneOptions) -> Result<Scene> {
    let camera = Camera::new()
        .with_resolution(600, 400)
        .with_position(Vec3::new(-4.0, 2.0, 4.0), Vec3::new(0.0, 1.0, -1.0), Vec3::Y)
        .with_fov(80.0);
    let mut scene = Scene::new(camera);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let ground = Lambertian::new(Color::new(1.0, 1.0, 0.2));
    scene
        .objects
        .add(Box::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_color(&mut rng, 0.0, 1.0) * random_color(&mut rng, 0.0, 1.0);
                scene
                    .objects
                    .add(Box::new(Sphere::new(center, 0.2, Lambertian::new(albedo))));
            } else if choose_mat < 0.95 {
                let albedo = random_color(&mut rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                scene
                    .objects
                    .add(Box::new(Sphere::new(center, 0.2, Metal::new(albedo, fuzz))));
            } else {
                scene
                    .objects
                    .add(Box::new(Sphere::new(center, 0.2, Dielectric::new(1.5))));
            }
        }
    }

    let light = DiffuseLight::new(Color::ONE);
    for (x, z) in [(-5.0, -5.0), (-5.0, 5.0), (5.0, -5.0), (5.0, 5.0)] {
        scene
            .objects
            .add(Box::new(Sphere::new(Vec3::new(x, 8.0, z), 3.0, light.clone())));
    }

    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, -2.5),
        1.0,
        Lambertian::new(Color::new(1.0, 0.2, 0.2)),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Dielectric::new(1.5),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 2.5),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 2.0, -6.0),
        2.0,
        Metal::new(Color::new(0.2, 0.5, 1.0), 0.4),
    )));

    if let Some(path) = options.obj {
        let mesh = load_mesh(path, &options.obj_options)?;
        scene.add_mesh(&mesh, Lambertian::new(Color::ONE));
    }

    Ok(scene)
}

/// Height of the procedural terrain at (x, z).
fn terrain_height(x: f32, z: f32) -> f32 {
    0.3 * (2.0 * x).sin() * (2.0 * z).cos() + 0.1 * (5.0 * x + 3.0 * z).sin()
}

/// Square height field of `cells x cells` quads centred on the origin.
fn terrain(cells: u32, size: f32) -> Mesh {
    let step = size / cells as f32;
    let half = size / 2.0;
    let row = cells + 1;

    let mut positions = Vec::with_capacity((row * row) as usize);
    for j in 0..row {
        for i in 0..row {
            let x = i as f32 * step - half;
            let z = j as f32 * step - half;
            positions.push(Vec3::new(x, terrain_height(x, z), z));
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for j in 0..cells {
        for i in 0..cells {
            let v00 = j * row + i;
            let v10 = v00 + 1;
            let v01 = v00 + row;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v01, v10, v10, v01, v11]);
        }
    }

    Mesh::new(positions, indices)
}

fn grid() -> Scene {
    let camera = Camera::new()
        .with_resolution(540, 540)
        .with_position(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_fov(60.0);
    let mut scene = Scene::new(camera);

    scene.add_mesh(&terrain(96, 6.0), Lambertian::new(Color::new(0.8, 0.8, 0.8)));

    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 0.6, 0.0),
        0.4,
        Metal::new(Color::new(0.9, 0.9, 0.9), 0.05),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(-150.0, 0.0, 0.0),
        100.0,
        DiffuseLight::new(Color::new(0.2, 0.2, 2.0)),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(150.0, 0.0, 0.0),
        100.0,
        DiffuseLight::new(Color::new(2.0, 0.2, 0.2)),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 40.0, 0.0),
        10.0,
        DiffuseLight::new(Color::splat(1.5)),
    )));

    scene
}

fn mesh(options: &SceneOptions) -> Result<Scene> {
    let Some(path) = options.obj else {
        bail!("the mesh scene needs an OBJ file (--obj <PATH>)");
    };

    let camera = Camera::new()
        .with_resolution(400, 400)
        .with_position(Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y)
        .with_fov(40.0);
    let mut scene = Scene::new(camera);

    let mesh = load_mesh(path, &options.obj_options)?;
    scene.add_mesh(&mesh, Lambertian::new(Color::new(0.4, 0.2, 0.8)));

    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.6, 0.3, 0.0),
        0.3,
        Metal::new(Color::new(0.8, 0.2, 0.2), 0.5),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.6, 0.9, 0.0),
        0.3,
        Metal::new(Color::new(0.2, 0.8, 0.2), 0.05),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        0.3,
        DiffuseLight::new(Color::ONE),
    )));
    scene.objects.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Color::ONE),
    )));

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtw_renderer::Hittable;

    fn options() -> SceneOptions<'static> {
        SceneOptions {
            obj: None,
            obj_options: ObjOptions::default(),
            seed: 1,
        }
    }

    #[test]
    fn test_balls_is_reproducible() {
        let a = build(SceneKind::Balls, &options()).unwrap();
        let b = build(SceneKind::Balls, &options()).unwrap();

        assert_eq!(a.objects.len(), b.objects.len());
        assert_eq!(a.objects.bounding_box(), b.objects.bounding_box());
        // Ground, four lights and four feature spheres at least
        assert!(a.objects.len() > 9);
        assert_eq!(a.triangles, 0);
    }

    #[test]
    fn test_terrain_counts() {
        let mesh = terrain(4, 2.0);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 32);
    }

    #[test]
    fn test_grid_scene() {
        let scene = build(SceneKind::Grid, &options()).unwrap();
        assert_eq!(scene.triangles, 96 * 96 * 2);
        assert_eq!(scene.objects.len(), scene.triangles + 4);
    }

    #[test]
    fn test_mesh_scene_needs_obj() {
        assert!(build(SceneKind::Mesh, &options()).is_err());
    }

    #[test]
    fn test_mesh_scene_reports_missing_file() {
        let path = Path::new("does/not/exist.obj");
        let options = SceneOptions {
            obj: Some(path),
            ..options()
        };
        let err = build(SceneKind::Mesh, &options).err().unwrap();
        assert!(err.to_string().contains("exist.obj"));
    }
}
