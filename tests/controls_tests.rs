use approx::assert_relative_eq;
use bounce_scene::camera::Camera;
use bounce_scene::controls::{OrbitControls, PointerButton};
use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

fn camera_on_z_axis() -> Camera {
    let mut camera = Camera::new(1.0);
    camera.set_position(Vec3::new(0.0, 0.0, 5.0));
    camera
}

#[test]
fn test_rotate_without_damping_applies_fully() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.rotate_left(-FRAC_PI_2);
    assert!(controls.update(&mut camera));

    let position = camera.position();
    assert_relative_eq!(position.x, 5.0, epsilon = 1e-4);
    assert_relative_eq!(position.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(position.z, 0.0, epsilon = 1e-4);

    // Nothing pending afterwards.
    assert!(!controls.update(&mut camera));
}

#[test]
fn test_damping_eases_out() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);
    controls.enable_damping = true;

    controls.rotate_left(1.0);
    let start = camera.position();
    controls.update(&mut camera);
    let first = camera.position();
    controls.update(&mut camera);
    let second = camera.position();

    let first_move = start.distance(first);
    let second_move = first.distance(second);
    assert!(first_move > 0.0);
    assert!(second_move < first_move);

    // A 0.05 share of one radian on a radius of 5.
    assert_relative_eq!(first_move, 2.0 * 5.0 * (0.025f32).sin(), epsilon = 1e-3);
}

#[test]
fn test_damping_settles() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);
    controls.enable_damping = true;

    controls.rotate_left(1.0);
    for _ in 0..300 {
        controls.update(&mut camera);
    }

    assert!(!controls.update(&mut camera));
    assert_relative_eq!(camera.position().length(), 5.0, epsilon = 1e-3);
}

#[test]
fn test_wheel_zoom() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.wheel(1.0);
    controls.update(&mut camera);
    assert_relative_eq!(camera.position().length(), 4.75, epsilon = 1e-4);

    controls.wheel(-1.0);
    controls.update(&mut camera);
    assert_relative_eq!(camera.position().length(), 5.0, epsilon = 1e-4);
}

#[test]
fn test_distance_limits() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);
    controls.max_distance = 4.0;

    controls.update(&mut camera);

    assert_relative_eq!(camera.position().length(), 4.0, epsilon = 1e-4);
}

#[test]
fn test_polar_angle_is_clamped() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.rotate_up(-10.0);
    controls.update(&mut camera);

    let position = camera.position();
    assert!(position.is_finite());
    assert!(position.y < -4.99, "Camera should sit under the target, at {:?}", position);
}

#[test]
fn test_right_drag_pans_target() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.pointer_down(PointerButton::Secondary, Vec2::new(0.0, 0.0));
    controls.pointer_move(Vec2::new(100.0, 0.0), 600.0, &camera);
    controls.update(&mut camera);

    assert!(controls.target.x < 0.0);
    assert_relative_eq!(controls.target.y, 0.0, epsilon = 1e-5);
    assert_eq!(camera.target(), controls.target);
    // Panning moves the camera with the target.
    assert_relative_eq!(camera.position().z, 5.0, epsilon = 1e-4);
}

#[test]
fn test_left_drag_orbits() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.pointer_down(PointerButton::Primary, Vec2::new(0.0, 0.0));
    controls.pointer_move(Vec2::new(150.0, 0.0), 600.0, &camera);
    assert!(controls.update(&mut camera));

    assert_relative_eq!(camera.position().length(), 5.0, epsilon = 1e-4);
    assert!(camera.position().x < 0.0);
}

#[test]
fn test_move_after_release_does_nothing() {
    let mut camera = camera_on_z_axis();
    let mut controls = OrbitControls::new(&mut camera);

    controls.pointer_down(PointerButton::Primary, Vec2::new(0.0, 0.0));
    controls.pointer_up();
    controls.pointer_move(Vec2::new(150.0, 80.0), 600.0, &camera);

    assert!(!controls.update(&mut camera));
}
