//! # Scene Management Module
//!
//! The scene graph the designer edits: the van shell, the furniture placed in
//! it, and the meshes nested inside both.
//!
//! ## Key Components
//!
//! - [`Scene`] - Arena-backed node hierarchy with world matrices and bounds
//! - [`SceneNode`] - A node with a local transform, optional mesh and material
//! - [`ObjectKind`] - Closed tag for what picking resolves to (van or furniture)
//! - [`NodeId`] - Generational handle; stale once its node is removed
//!
//! ## Usage
//!
//! ```rust
//! use vanstudio::gfx::geometry::generate_box;
//! use vanstudio::gfx::scene::{Scene, SceneNode};
//! use cgmath::Vector3;
//!
//! let mut scene = Scene::new();
//! let bench = scene.add(
//!     SceneNode::furniture("bench", &generate_box(1.2, 0.45, 0.5))
//!         .with_position(Vector3::new(0.0, 0.225, -0.5)),
//! );
//! let center = scene.bounding_center(bench).unwrap();
//! assert!((center.y - 0.225).abs() < 1e-6);
//! ```

pub mod object;
pub mod scene;

// Re-export main types
pub use object::{Mesh, NodeId, NodeTransform, ObjectKind, SceneNode};
pub use scene::Scene;
