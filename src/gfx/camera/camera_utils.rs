use cgmath::Matrix4;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};
use crate::config::CameraConfig;

/// The viewport camera together with the navigation that drives it
#[derive(Debug, Clone)]
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    home: CameraConfig,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        let home = CameraConfig {
            eye: camera.eye,
            target: camera.target,
            ..CameraConfig::default()
        };
        Self {
            camera,
            controller,
            home,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            camera: OrbitCamera::from_config(config),
            controller: CameraController::from_config(config),
            home: config.clone(),
        }
    }

    /// Advances damped navigation by `dt` seconds
    pub fn update(&mut self, dt: f32) -> bool {
        self.controller.update(&mut self.camera, dt)
    }

    /// Returns the camera to its configured eye and target
    pub fn reset(&mut self) {
        log::debug!("Camera reset to {:?}", self.home.eye);
        self.camera.look_from(self.home.eye, self.home.target);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    /// Get the view projection matrix from the camera
    pub fn get_view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn test_reset_restores_home_view() {
        let config = CameraConfig::default();
        let mut manager = CameraManager::from_config(&config);

        manager.camera.pan((2.0, 1.0));
        manager.camera.add_yaw(1.0);
        manager.reset();

        assert!((manager.camera.eye - config.eye).magnitude() < 1e-4);
        assert!((manager.camera.target - Vector3::new(0.0, 0.0, 0.0)).magnitude() < 1e-6);
    }
}
