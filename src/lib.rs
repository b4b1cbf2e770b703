// src/lib.rs
//! Van Studio
//!
//! Interactive furniture manipulation for a 3D van interior designer, built
//! on cgmath and winit.
//!
//! Furniture is moved two ways: a free drag that slides an object over a
//! horizontal plane at its locked height, and a transform gizmo that
//! translates, rotates or scales through a proxy handle centred on the
//! object. The [`ViewportHost`](viewport::ViewportHost) routes pointer and
//! keyboard input between them, camera navigation and selection.

pub mod app;
pub mod config;
pub mod controls;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod viewport;

// Re-export main types for convenience
pub use app::StudioApp;
pub use error::{ManipulationError, Result};
pub use viewport::ViewportHost;

/// Creates a default studio application instance
pub fn default() -> anyhow::Result<StudioApp> {
    StudioApp::new()
}
