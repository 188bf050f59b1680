//! Rigid body representation for the CPU physics world.
//!
//! Spheres and infinite planes, static when mass is zero.
//! A plane's normal is its local +Z axis, rotated by the body orientation.

use glam::{Quat, Vec3};

const DEFAULT_LINEAR_DAMPING: f32 = 0.01;
const DEFAULT_ANGULAR_DAMPING: f32 = 0.01;

/// Collision shape attached to a body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Plane,
}

/// Opaque reference to a body owned by a [`crate::world::World`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) usize);

#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    shape: Shape,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,
}

impl Body {
    pub fn new_sphere(position: [f32; 3], radius: f32, mass: f32) -> Self {
        Self::new_body(position, mass, Shape::Sphere { radius })
    }

    pub fn new_static_sphere(position: [f32; 3], radius: f32) -> Self {
        Self::new_body(position, 0.0, Shape::Sphere { radius })
    }

    /// Infinite static plane through `position`.
    pub fn new_plane(position: [f32; 3]) -> Self {
        Self::new_body(position, 0.0, Shape::Plane)
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    pub fn with_velocity(mut self, velocity: [f32; 3]) -> Self {
        self.velocity = Vec3::from(velocity);
        self
    }

    fn new_body(position: [f32; 3], mass: f32, shape: Shape) -> Self {
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inv_inertia = match shape {
            // Solid sphere: I = 2/5 m r^2
            Shape::Sphere { radius } if mass > 0.0 => 1.0 / (0.4 * mass * radius * radius),
            _ => 0.0,
        };

        Self {
            position: Vec3::from(position),
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            shape,
            mass,
            inv_mass,
            inv_inertia,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// World-space normal of a plane body; `None` for other shapes.
    pub fn plane_normal(&self) -> Option<Vec3> {
        match self.shape {
            Shape::Plane => Some(self.orientation * Vec3::Z),
            _ => None,
        }
    }

    /// Velocity of a point offset by `r` from the center of mass.
    pub(crate) fn velocity_at(&self, r: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(r)
    }

    pub(crate) fn apply_impulse(&mut self, impulse: Vec3, r: Vec3) {
        if self.is_static() {
            return;
        }
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += r.cross(impulse) * self.inv_inertia;
    }
}
