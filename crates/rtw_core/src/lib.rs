//! rtw Core - scene geometry for the rtw ray tracer.
//!
//! This crate provides:
//!
//! - **Mesh**: indexed triangle geometry with bounds
//! - **OBJ support**: Wavefront OBJ loading with placement (scale + offset)
//!
//! # Example
//!
//! ```ignore
//! use rtw_core::{load_obj, ObjOptions};
//! use rtw_math::Vec3;
//!
//! let options = ObjOptions::new(13.0, Vec3::new(-3.0, -0.4, 0.0));
//! let mesh = load_obj("bunny.obj", &options)?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod mesh;
pub mod obj;

// Re-export commonly used types
pub use mesh::Mesh;
pub use obj::{load_obj, load_obj_from_str, LoadError, LoadResult, ObjOptions};
