use super::orbit_camera::OrbitCamera;
use crate::{config::CameraConfig, controls::AmbientNavigation};

/// Orbit/pan/zoom navigation driven by pointer input
///
/// This is the "ambient" control: it only sees pointer input that no
/// manipulation controller claimed, and it is switched off for the duration
/// of every manipulation gesture.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    enabled: bool,
    is_shift_held: bool,
    is_pointer_pressed: bool,
    last_pointer: Option<(f32, f32)>,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping_factor: 1.0,
            enabled: true,
            is_shift_held: false,
            is_pointer_pressed: false,
            last_pointer: None,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            pan_speed: config.pan_speed,
            damping_factor: config.damping_factor.clamp(f32::EPSILON, 1.0),
            ..Self::new(config.rotate_speed, config.zoom_speed)
        }
    }

    /// Primary button went down on empty space (or on nothing a controller wanted)
    pub fn pointer_pressed(&mut self, position: (f32, f32)) {
        if !self.enabled {
            return;
        }
        self.is_pointer_pressed = true;
        self.last_pointer = Some(position);
    }

    pub fn pointer_released(&mut self) {
        self.is_pointer_pressed = false;
        self.last_pointer = None;
    }

    /// Returns true if the camera changed
    pub fn pointer_moved(&mut self, position: (f32, f32), camera: &mut OrbitCamera) -> bool {
        if !self.enabled || !self.is_pointer_pressed {
            return false;
        }

        let Some(last) = self.last_pointer.replace(position) else {
            return false;
        };
        let delta = (position.0 - last.0, position.1 - last.1);

        if self.is_shift_held {
            // SHIFT + DRAG = PAN (move focus point)
            camera.pan((-delta.0 * self.pan_speed, delta.1 * self.pan_speed));
        } else {
            // NORMAL DRAG = ROTATE (orbit around focus), applied with damping in `update`
            self.pending_yaw += -delta.0 * self.rotate_speed;
            self.pending_pitch += delta.1 * self.rotate_speed;
        }
        true
    }

    /// Positive `delta` zooms in
    pub fn wheel(&mut self, delta: f32, camera: &mut OrbitCamera) -> bool {
        if !self.enabled {
            return false;
        }
        camera.add_distance(-delta * self.zoom_speed);
        true
    }

    pub fn set_shift_held(&mut self, held: bool) {
        self.is_shift_held = held;
    }

    /// Applies a damped share of the pending orbit; call once per frame.
    ///
    /// `dt` is in seconds and the damping factor is tuned for 60 frames per
    /// second. Returns true while the camera is still settling.
    pub fn update(&mut self, camera: &mut OrbitCamera, dt: f32) -> bool {
        if self.pending_yaw.abs() < 1e-6 && self.pending_pitch.abs() < 1e-6 {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            return false;
        }

        let share = 1.0 - (1.0 - self.damping_factor).powf((dt * 60.0).max(0.0));
        camera.add_yaw(self.pending_yaw * share);
        camera.add_pitch(self.pending_pitch * share);
        self.pending_yaw *= 1.0 - share;
        self.pending_pitch *= 1.0 - share;
        true
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_pointer_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_pointer_pressed && !self.is_shift_held
    }
}

impl AmbientNavigation for CameraController {
    fn set_navigation_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!("Ambient navigation {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        if !enabled {
            // a suspended orbit must not keep spinning or resume mid-gesture
            self.pointer_released();
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
        }
    }

    fn is_navigation_enabled(&self) -> bool {
        self.enabled
    }
}
