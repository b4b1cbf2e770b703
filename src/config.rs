//! # Studio Configuration
//!
//! Plain configuration structs for the viewport host and its controllers.
//! Every struct has a `Default` that reproduces the stock van designer feel,
//! and `with_*` helpers for the values callers usually tweak.
//!
//! ```rust
//! use vanstudio::config::StudioConfig;
//!
//! let config = StudioConfig::default()
//!     .with_movement_scale(0.5)
//!     .with_gizmo_size(1.0);
//! assert_eq!(config.gizmo.movement_scale, 0.5);
//! ```

use cgmath::{Deg, Vector3};

use crate::gfx::gizmos::TransformMode;

/// Top-level configuration for a [`ViewportHost`](crate::viewport::ViewportHost).
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub camera: CameraConfig,
    pub gizmo: GizmoConfig,
    pub selection: SelectionConfig,
    pub picking: PickingConfig,
    /// Whether free-drag is enabled when the host starts.
    pub free_drag_enabled: bool,
    /// Maximum number of undo steps kept by [`TransformHistory`](crate::controls::TransformHistory).
    pub history_capacity: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            gizmo: GizmoConfig::default(),
            selection: SelectionConfig::default(),
            picking: PickingConfig::default(),
            free_drag_enabled: true,
            history_capacity: 50,
        }
    }
}

impl StudioConfig {
    pub fn with_movement_scale(mut self, scale: f32) -> Self {
        self.gizmo.movement_scale = scale;
        self
    }

    pub fn with_gizmo_size(mut self, size: f32) -> Self {
        self.gizmo.size = size;
        self
    }

    pub fn with_attach_on_select(mut self, attach: bool) -> Self {
        self.selection.attach_on_select = attach;
        self
    }

    pub fn with_free_drag_enabled(mut self, enabled: bool) -> Self {
        self.free_drag_enabled = enabled;
        self
    }

    pub fn with_viewport_size(mut self, width: f32, height: f32) -> Self {
        self.camera.viewport_size = (width, height);
        self
    }
}

/// Orbit camera and ambient navigation settings.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Vertical field of view.
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Initial and reset eye position.
    pub eye: Vector3<f32>,
    /// Initial and reset orbit target.
    pub target: Vector3<f32>,
    /// Largest angle between the view direction and world-up; `PI / 2` keeps
    /// the camera above the floor.
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining orbit velocity dropped per frame.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Initial surface size in physical pixels.
    pub viewport_size: (f32, f32),
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 1000.0,
            eye: Vector3::new(5.0, 3.0, 5.0),
            target: Vector3::new(0.0, 0.0, 0.0),
            max_polar_angle: std::f32::consts::FRAC_PI_2,
            min_distance: 1.1,
            max_distance: 50.0,
            damping_factor: 0.25,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
            viewport_size: (1200.0, 800.0),
        }
    }
}

/// Transform gizmo settings.
#[derive(Debug, Clone)]
pub struct GizmoConfig {
    /// Handle size multiplier (screen-constant).
    pub size: f32,
    pub mode: TransformMode,
    /// Proxy-to-object delta multiplier.
    pub movement_scale: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            size: 0.75,
            mode: TransformMode::Translate,
            movement_scale: 1.0,
        }
    }
}

/// Selection indicator and click handling.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Emissive colour applied to selected meshes.
    pub highlight_color: [f32; 3],
    pub highlight_intensity: f32,
    /// Pointer travel (pixels) below which a press/release counts as a click.
    pub click_tolerance_px: f32,
    /// Attach the transform gizmo when furniture is selected.
    pub attach_on_select: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            // 0x2194ce
            highlight_color: [33.0 / 255.0, 148.0 / 255.0, 206.0 / 255.0],
            highlight_intensity: 0.3,
            click_tolerance_px: 4.0,
            attach_on_select: true,
        }
    }
}

/// Raycast picking settings.
#[derive(Debug, Clone)]
pub struct PickingConfig {
    /// Ancestor levels walked from a hit mesh looking for a tagged object.
    pub max_ancestor_depth: usize,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: 32,
        }
    }
}
