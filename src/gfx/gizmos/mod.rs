//! # Gizmo System
//!
//! Interactive handles drawn over the scene. The [`TransformGizmo`] is bound
//! to a [`ProxyHandle`] rather than to a scene node, so its pivot is always
//! the manipulated object's visual center.
//!
//! ## Usage
//!
//! ```rust
//! use vanstudio::config::GizmoConfig;
//! use vanstudio::gfx::gizmos::{ProxyHandle, TransformGizmo, TransformMode};
//! use cgmath::Vector3;
//!
//! let mut gizmo = TransformGizmo::new(&GizmoConfig::default()).unwrap();
//! gizmo.attach(ProxyHandle::at(Vector3::new(0.0, 0.5, 0.0)));
//! gizmo.set_mode("rotate".parse::<TransformMode>().unwrap());
//! assert_eq!(gizmo.mode(), TransformMode::Rotate);
//! ```

pub mod transform_gizmo;

// Re-export main types
pub use transform_gizmo::{
    GizmoAxis, GizmoEvent, GizmoView, ProxyHandle, TransformGizmo, TransformMode,
};
