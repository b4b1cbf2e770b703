//! # Controller Traits
//!
//! The seams between the viewport host and the two manipulation controllers.
//!
//! Controllers never own the scene, the camera navigation or each other.
//! Every gesture callback receives a [`ManipulationContext`] that lends them
//! what they need for the duration of the call.

use super::history::History;
use crate::gfx::scene::Scene;

/// The camera orbit/pan/zoom control, switched off during manipulation.
pub trait AmbientNavigation {
    fn set_navigation_enabled(&mut self, enabled: bool);

    fn is_navigation_enabled(&self) -> bool;
}

/// A controller that can run pointer gestures on scene objects.
///
/// Two independent switches gate a controller:
///
/// - `enabled` is the user-facing toggle (`enable`, `disable`, `toggle`)
/// - `suspended` is raised by the *other* controller for the duration of its
///   gesture
///
/// A controller only starts gestures while it is enabled and not suspended.
/// Enabling a suspended controller therefore takes effect once the peer's
/// gesture ends.
pub trait ManipulationController {
    /// Human readable name used in log output
    fn name(&self) -> &str;

    fn enable(&mut self);

    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    /// Flip the user-facing switch
    fn toggle(&mut self) {
        if self.is_enabled() {
            self.disable();
        } else {
            self.enable();
        }
    }

    /// Whether a gesture is running right now
    fn is_dragging(&self) -> bool;

    /// Called by the peer controller when its gesture starts
    fn suspend(&mut self);

    /// Called by the peer controller when its gesture ends
    fn resume(&mut self);

    fn is_suspended(&self) -> bool;

    /// Enabled and not suspended
    fn is_active(&self) -> bool {
        self.is_enabled() && !self.is_suspended()
    }
}

/// Everything a controller borrows while handling one input event
pub struct ManipulationContext<'a> {
    pub scene: &'a mut Scene,
    pub navigation: &'a mut dyn AmbientNavigation,
    /// The other manipulation controller
    pub peer: &'a mut dyn ManipulationController,
    pub history: &'a mut dyn History,
}

impl ManipulationContext<'_> {
    /// Gesture start: silence the camera and the peer
    pub(crate) fn begin_gesture(&mut self) {
        self.navigation.set_navigation_enabled(false);
        self.peer.suspend();
    }

    /// Gesture end (completed or cancelled): hand control back
    pub(crate) fn end_gesture(&mut self) {
        self.navigation.set_navigation_enabled(true);
        self.peer.resume();
    }
}
