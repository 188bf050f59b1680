//! Orbit controls with inertia.
//!
//! Left drag orbits, right drag pans, the wheel dollies. Input accumulates
//! deltas; `update` applies a `damping_factor` share of them each frame and
//! decays the rest, so motion eases out after the pointer stops.
//!
//! Spherical coordinates: theta is the azimuth around +Y measured from +Z
//! toward +X, phi is the polar angle from +Y.

use crate::camera::Camera;
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
const POLAR_EPSILON: f32 = 1e-6;
const CHANGE_EPSILON: f32 = 1e-6;
const ZOOM_BASE: f32 = 0.95;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Pan,
}

#[derive(Copy, Clone, Debug, Default)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    drag: DragState,
    last_pointer: Vec2,
}

impl OrbitControls {
    /// Creates controls orbiting the origin and snaps `camera` to look at it.
    pub fn new(camera: &mut Camera) -> Self {
        let mut controls = Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            drag: DragState::Idle,
            last_pointer: Vec2::ZERO,
        };
        controls.update(camera);
        controls
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        self.drag = match button {
            PointerButton::Primary => DragState::Rotate,
            PointerButton::Secondary => DragState::Pan,
            PointerButton::Other => DragState::Idle,
        };
        self.last_pointer = position;
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Feeds a cursor move. `client_height` is the viewport height in the
    /// same units as `position`.
    pub fn pointer_move(&mut self, position: Vec2, client_height: f32, camera: &Camera) {
        let delta = position - self.last_pointer;
        self.last_pointer = position;
        if client_height <= 0.0 {
            return;
        }

        match self.drag {
            DragState::Rotate => {
                let delta = delta * self.rotate_speed;
                self.rotate_left(2.0 * PI * delta.x / client_height);
                self.rotate_up(2.0 * PI * delta.y / client_height);
            }
            DragState::Pan => self.pan(delta * self.pan_speed, client_height, camera),
            DragState::Idle => {}
        }
    }

    /// Dollies by one wheel notch; positive `scroll` moves toward the target.
    pub fn wheel(&mut self, scroll: f32) {
        let zoom_scale = ZOOM_BASE.powf(self.zoom_speed);
        if scroll > 0.0 {
            self.scale *= zoom_scale;
        } else if scroll < 0.0 {
            self.scale /= zoom_scale;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn pan(&mut self, delta: Vec2, client_height: f32, camera: &Camera) {
        let offset = camera.position() - self.target;
        let target_distance = offset.length() * (camera.fov_degrees.to_radians() / 2.0).tan();
        let (right, up) = camera.basis();

        self.pan_offset -= right * (2.0 * delta.x * target_distance / client_height);
        self.pan_offset += up * (2.0 * delta.y * target_distance / client_height);
    }

    /// Moves `camera` by the pending deltas. Returns whether it moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let last_position = camera.position();
        let last_target = camera.target();

        let mut spherical = Spherical::from_offset(camera.position() - self.target);
        let share = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.theta * share;
        spherical.phi += self.spherical_delta.phi * share;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * share;

        camera.set_position(self.target + spherical.to_offset());
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position().distance_squared(last_position) > CHANGE_EPSILON
            || camera.target().distance_squared(last_target) > CHANGE_EPSILON
    }
}
