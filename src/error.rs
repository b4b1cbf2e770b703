//! Error types for the manipulation core.

use thiserror::Error;

use crate::gfx::scene::NodeId;

/// Errors reported by the controllers and the viewport host.
///
/// None of these are fatal: every operation that returns one has already
/// logged it and left its state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManipulationError {
    /// The node is not (or no longer) part of the scene.
    #[error("object not found in scene: {0:?}")]
    ObjectNotFound(NodeId),

    /// Unrecognised transform mode name.
    #[error("invalid transform mode: {0:?} (expected translate, rotate or scale)")]
    InvalidMode(String),

    /// Movement scale must be finite and positive.
    #[error("invalid movement scale: {0}")]
    InvalidMovementScale(f32),

    /// Gizmo handle size must be finite and positive.
    #[error("invalid gizmo size: {0}")]
    InvalidGizmoSize(f32),

    /// The transform gizmo failed to initialise; the controller ignores all calls.
    #[error("transform controller is inert")]
    ControllerInert,

    /// The operation conflicts with a gesture that is currently running.
    #[error("a manipulation gesture is in progress")]
    GestureInProgress,
}

/// Result type for manipulation operations.
pub type Result<T> = std::result::Result<T, ManipulationError>;
