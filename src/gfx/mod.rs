//! # Graphics Module
//!
//! The 3D side of the designer: scene graph, camera, picking and the
//! transform gizmo.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped navigation
//! - **Scene Management** ([`scene`]) - Node hierarchy, world matrices and bounds
//! - **Picking** ([`picking`]) - Screen rays, plane and box intersection
//! - **Gizmos** ([`gizmos`]) - Translate/rotate/scale handle around a proxy
//! - **Geometry** ([`geometry`]) - Procedural stand-in shapes
//!
//! Nothing here draws; the host application renders the scene however it likes.

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod material;
pub mod picking;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use scene::Scene;
