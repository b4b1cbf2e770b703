//! # Viewport
//!
//! The host that ties the scene, camera, picking and both manipulation
//! controllers together, plus the input and selection types it works with.
//!
//! ```rust
//! use vanstudio::prelude::*;
//!
//! let mut host = ViewportHost::new(StudioConfig::default());
//! let bed = host.add_to_scene(SceneNode::furniture("bed", &generate_cube()));
//!
//! host.select(bed).unwrap();
//! assert_eq!(host.transform().active_object(), Some(bed));
//!
//! host.handle_input(ViewportInput::KeyPressed(ViewportKey::Character('r')));
//! assert_eq!(host.transform().mode(), TransformMode::Rotate);
//! ```

pub mod host;
pub mod input;
pub mod selection;

pub use host::{ViewportHost, DEFAULT_PLACEMENT_DISTANCE};
pub use input::{translate_window_event, PointerButton, ViewportInput, ViewportKey};
pub use selection::SelectionSession;
