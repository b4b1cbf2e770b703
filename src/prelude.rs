//! # Van Studio Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use vanstudio::prelude::*;
//!
//! let mut host = ViewportHost::new(StudioConfig::default());
//! let desk = host.add_to_scene(
//!     SceneNode::furniture("desk", &generate_box(1.0, 0.75, 0.5))
//!         .with_position(Vector3::new(0.0, 0.375, 0.0)),
//! );
//! assert!(host.free_drag().is_registered(desk));
//! ```

// Re-export core application types
pub use crate::app::StudioApp;
pub use crate::config::{CameraConfig, GizmoConfig, PickingConfig, SelectionConfig, StudioConfig};
pub use crate::error::{ManipulationError, Result};
pub use crate::viewport::{PointerButton, ViewportHost, ViewportInput, ViewportKey};

// Re-export controllers
pub use crate::controls::{
    FreeDragController, History, ManipulationController, NullHistory, PreciseTransformController,
    TransformHistory,
};

// Re-export graphics and scene types
pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::geometry::{generate_box, generate_cube, generate_floor, GeometryData};
pub use crate::gfx::gizmos::TransformMode;
pub use crate::gfx::material::Material;
pub use crate::gfx::picking::Ray;
pub use crate::gfx::scene::{NodeId, ObjectKind, Scene, SceneNode};

// Re-export common external dependencies
pub use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3, Zero};
