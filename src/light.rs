//! Scene lights and the directional shadow camera.

use crate::mesh::Color;
use glam::{Mat4, Vec3};

const DEFAULT_SHADOW_MAP_SIZE: u32 = 512;
const DEFAULT_SHADOW_NEAR: f32 = 0.5;
const DEFAULT_SHADOW_FAR: f32 = 500.0;
const DEFAULT_SHADOW_EXTENT: f32 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Orthographic frustum the shadow map is rendered through.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub map_size: u32,
    pub bias: f32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            left: -DEFAULT_SHADOW_EXTENT,
            right: DEFAULT_SHADOW_EXTENT,
            top: DEFAULT_SHADOW_EXTENT,
            bottom: -DEFAULT_SHADOW_EXTENT,
            near: DEFAULT_SHADOW_NEAR,
            far: DEFAULT_SHADOW_FAR,
            map_size: DEFAULT_SHADOW_MAP_SIZE,
            bias: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowCamera,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
            cast_shadow: false,
            shadow: ShadowCamera::default(),
        }
    }

    /// Unit vector from the target toward the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        let up = if self.direction().abs_diff_eq(Vec3::Y, 1e-4) {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let s = &self.shadow;
        let projection = Mat4::orthographic_rh(s.left, s.right, s.bottom, s.top, s.near, s.far);
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_inside_shadow_frustum() {
        let mut light = DirectionalLight::new(Color::WHITE, 0.2);
        light.position = Vec3::new(5.0, 5.0, 5.0);
        light.shadow.far = 15.0;

        let clip = light.shadow_view_projection().project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }
}
