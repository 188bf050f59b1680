use approx::assert_relative_eq;
use bounce_scene::camera::{Camera, DEFAULT_FOV_DEGREES, FAR_PLANE, NEAR_PLANE};
use glam::{Mat4, Vec3};

#[test]
fn test_camera_creation() {
    let camera = Camera::new(16.0 / 9.0);
    assert_eq!(camera.fov_degrees, DEFAULT_FOV_DEGREES);
    assert_eq!(camera.near, NEAR_PLANE);
    assert_eq!(camera.far, FAR_PLANE);

    let matrix = camera.view_projection_matrix();
    assert_ne!(matrix, Mat4::IDENTITY, "Camera matrix should not be identity");
    assert!(matrix.is_finite(), "Camera matrix contains non-finite values");
}

#[test]
fn test_target_projects_to_center() {
    let mut camera = Camera::new(4.0 / 3.0);
    camera.set_position(Vec3::new(-3.0, 3.0, 3.0));
    camera.look_at(Vec3::ZERO);

    let ndc = camera.view_projection_matrix().project_point3(Vec3::ZERO);
    assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn test_projection_is_cached_until_updated() {
    let mut camera = Camera::new(1.0);
    let before = camera.projection_matrix();

    camera.aspect = 2.0;
    assert_eq!(camera.projection_matrix(), before);

    camera.update_projection_matrix();
    assert_ne!(camera.projection_matrix(), before);
}

#[test]
fn test_basis_is_orthonormal() {
    let mut camera = Camera::new(1.0);
    camera.set_position(Vec3::new(-3.0, 3.0, 3.0));
    camera.look_at(Vec3::ZERO);

    let (right, up) = camera.basis();
    assert_relative_eq!(right.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(up.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(right.dot(up), 0.0, epsilon = 1e-5);
    assert_relative_eq!(right.y, 0.0, epsilon = 1e-5);
    assert!(up.y > 0.0);
}
