//! # Manipulation Controls
//!
//! The two ways a designer moves furniture, and the seams they share.
//!
//! ## Key Components
//!
//! - [`FreeDragController`] - Planar drag over a height-locked anchor plane
//! - [`PreciseTransformController`] - Gizmo translate/rotate/scale through a
//!   centered proxy handle
//! - [`ManipulationController`] - Enable/suspend switches both controllers share
//! - [`ManipulationContext`] - What a controller borrows while handling input
//! - [`History`] - Receives one commit per completed gesture
//!
//! The controllers are mutually exclusive: whichever starts a gesture
//! suspends the other, along with ambient camera navigation, until the
//! gesture ends.

pub mod drag_controls;
pub mod history;
pub mod traits;
pub mod transform_controls;

// Re-export main types
pub use drag_controls::FreeDragController;
pub use history::{History, NullHistory, TransformHistory};
pub use traits::{AmbientNavigation, ManipulationContext, ManipulationController};
pub use transform_controls::PreciseTransformController;
