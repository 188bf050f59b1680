//! Perspective camera.
//!
//! Y-up, right-handed, depth mapped to [0, 1] for wgpu.
//! The projection is cached and only rebuilt by `update_projection_matrix`.

use glam::{Mat4, Vec3};

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
const UP_VECTOR: Vec3 = Vec3::Y;

pub struct Camera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    position: Vec3,
    target: Vec3,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Rebuilds the projection from `fov_degrees`, `aspect`, `near`, `far`.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, UP_VECTOR)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Camera-space right and up axes in world coordinates.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(UP_VECTOR).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }
}
