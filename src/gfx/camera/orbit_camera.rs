use cgmath::*;

use super::camera_utils::Camera;
use crate::config::CameraConfig;

/// Orbit camera around a target point, Y-up
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    /// Builds a camera from the configured eye/target and projection settings
    pub fn from_config(config: &CameraConfig) -> Self {
        let (width, height) = config.viewport_size;
        let mut camera = Self::new(1.0, 0.0, 0.0, config.target, width / height.max(1.0));
        camera.fovy = config.fovy.into();
        camera.znear = config.znear;
        camera.zfar = config.zfar;
        camera.bounds = OrbitCameraBounds {
            min_distance: Some(config.min_distance),
            max_distance: Some(config.max_distance),
            min_pitch: std::f32::consts::FRAC_PI_2 - config.max_polar_angle,
            ..OrbitCameraBounds::default()
        };
        camera.look_from(config.eye, config.target);
        camera
    }

    /// Places the eye at `eye` looking at `target`, deriving distance, pitch and yaw
    pub fn look_from(&mut self, eye: Vector3<f32>, target: Vector3<f32>) {
        let offset = eye - target;
        let distance = offset.magnitude();
        self.target = target;

        if distance <= f32::EPSILON {
            self.update();
            return;
        }

        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.set_distance(distance);
        self.set_pitch(self.pitch);
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance.max(1.0 + f32::EPSILON)) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;

        let total_movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        // Move both eye and target to maintain the view direction
        self.eye += total_movement;
        self.target += total_movement;
    }

    /// Unit vector from the eye towards the target
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.eye).normalize()
    }

    /// Frames a bounding box: target its center, back off far enough to fit it
    pub fn focus_on(&mut self, center: Vector3<f32>, size: Vector3<f32>) {
        let max_dim = size.x.max(size.y).max(size.z);
        let camera_distance = (max_dim / (self.fovy.0 / 2.0).sin()).abs();
        let eye = center + Vector3::new(1.0, 1.0, 1.0) * (camera_distance * 0.5);
        self.look_from(eye, center);
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(Point3::from_vec(self.eye), Point3::from_vec(self.target), self.up)
    }

    /// OpenGL-convention projection (NDC depth -1..1), which picking unprojects
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: Some(16.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + f32::EPSILON,
            max_pitch: std::f32::consts::FRAC_PI_2 - f32::EPSILON,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}
