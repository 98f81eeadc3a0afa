//! Scene camera

use glam::Vec3;

use crate::consts::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_HEIGHT, CAMERA_NEAR};

/// Perspective camera looking down the -Z axis onto the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view (degrees)
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_HEIGHT),
            fov_deg: CAMERA_FOV_DEG,
            aspect,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }

    /// Track a target on the ground plane; height stays fixed
    pub fn follow(&mut self, target: Vec3) {
        self.position.x = target.x;
        self.position.y = target.y;
    }

    /// Adjust projection to a new viewport size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}
