//! Wavefront OBJ loading.
//!
//! Only geometry is read: every model in the file is triangulated and merged
//! into a single [`Mesh`]. Material libraries referenced by the file are
//! ignored; the caller assigns one material to the whole mesh.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rtw_math::Vec3;
use thiserror::Error;

use crate::mesh::Mesh;

/// Errors that can occur during OBJ loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("No triangles found in {0}")]
    NoGeometry(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Placement applied to every vertex after parsing: `p * scale + offset`.
#[derive(Debug, Clone, Copy)]
pub struct ObjOptions {
    pub scale: f32,
    pub offset: Vec3,
}

impl ObjOptions {
    pub fn new(scale: f32, offset: Vec3) -> Self {
        Self { scale, offset }
    }
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self::new(1.0, Vec3::ZERO)
    }
}

/// Load an OBJ file from disk.
pub fn load_obj<P: AsRef<Path>>(path: P, options: &ObjOptions) -> LoadResult<Mesh> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mesh = parse_obj(&mut reader, options, &path.display().to_string())?;

    log::info!(
        "Loaded {}: {} triangles, {} vertices",
        path.display(),
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

/// Load OBJ data that is already in memory.
pub fn load_obj_from_str(source: &str, options: &ObjOptions) -> LoadResult<Mesh> {
    let mut bytes = source.as_bytes();
    parse_obj(&mut bytes, options, "<memory>")
}

fn parse_obj<B: BufRead>(reader: &mut B, options: &ObjOptions, name: &str) -> LoadResult<Mesh> {
    let load_options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };

    // Materials are assigned by the scene, not read from .mtl files
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options, |_: &Path| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    let mut mesh = Mesh::new(Vec::new(), Vec::new());
    for model in &models {
        let positions = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();
        mesh.append(&Mesh::new(positions, model.mesh.indices.clone()));
    }

    if mesh.triangle_count() == 0 {
        return Err(LoadError::NoGeometry(name.to_string()));
    }

    mesh.place(options.scale, options.offset);
    log::debug!("{}: {} model(s) merged", name, models.len());
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const QUAD_OBJ: &str = "\
# unit quad in the xy plane
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_split_into_two_triangles() {
        init_logs();
        let mesh = load_obj_from_str(QUAD_OBJ, &ObjOptions::default()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().len(), 2);
    }

    #[test]
    fn test_options_scale_then_offset() {
        let options = ObjOptions::new(2.0, Vec3::new(10.0, 0.0, 0.0));
        let mesh = load_obj_from_str(QUAD_OBJ, &options).unwrap();

        assert_eq!(mesh.bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(mesh.bounds.max, Vec3::new(12.0, 2.0, 0.0));
    }

    #[test]
    fn test_face_with_slashes() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vt 0 0
f 1/1/1 2/1/1 3/1/1
";
        let mesh = load_obj_from_str(source, &ObjOptions::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_no_faces_is_an_error() {
        let result = load_obj_from_str("v 0 0 0\nv 1 0 0\n", &ObjOptions::default());
        assert!(matches!(result, Err(LoadError::NoGeometry(_))));
    }

    #[test]
    fn test_missing_file() {
        init_logs();
        let result = load_obj("does/not/exist.obj", &ObjOptions::default());
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
