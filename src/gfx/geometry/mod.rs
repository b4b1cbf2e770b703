//! # Procedural Geometry Generation
//!
//! Generates simple shapes used as stand-ins for catalog models, so scenes can
//! be built without loading assets.
//!
//! ## Usage
//!
//! ```rust
//! use vanstudio::gfx::geometry::{generate_box, generate_floor};
//!
//! // A 1.2m x 0.9m x 0.6m cabinet whose origin sits on its base
//! let cabinet = generate_box(1.2, 0.9, 0.6).translated([0.0, 0.45, 0.0]);
//!
//! // The van floor
//! let floor = generate_floor(4.0, 1.8, 4);
//! ```

pub mod primitives;

pub use primitives::*;

/// Generated geometry in local space
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Shift every vertex by `offset`.
    ///
    /// Used to author a pivot that is not at the geometric center, e.g. a
    /// cabinet whose origin sits on the floor.
    pub fn translated(mut self, offset: [f32; 3]) -> Self {
        for vertex in &mut self.vertices {
            vertex[0] += offset[0];
            vertex[1] += offset[1];
            vertex[2] += offset[2];
        }
        self
    }
}
