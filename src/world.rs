//! CPU rigid-body world with fixed-timestep stepping.
//!
//! `step(fixed_step, elapsed, max_substeps)` accumulates wall-clock time and
//! runs at most `max_substeps` internal steps per call. Time left over once
//! the cap is hit is dropped, so a slow frame makes the simulation lag real
//! time rather than catch up later.

use crate::body::{Body, BodyHandle};
use crate::contact::{detect_contacts, solve_contacts, ContactMaterial};
use glam::{Quat, Vec3};

const DEFAULT_SOLVER_ITERATIONS: usize = 10;

pub struct World {
    gravity: Vec3,
    default_contact_material: ContactMaterial,
    solver_iterations: usize,
    bodies: Vec<Body>,
    accumulator: f32,
    time: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::ZERO,
            default_contact_material: ContactMaterial::default(),
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            bodies: Vec::new(),
            accumulator: 0.0,
            time: 0.0,
        }
    }

    pub fn set_gravity(&mut self, gravity: [f32; 3]) {
        self.gravity = Vec3::from(gravity);
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_default_contact_material(&mut self, material: ContactMaterial) {
        self.default_contact_material = material;
    }

    pub fn default_contact_material(&self) -> ContactMaterial {
        self.default_contact_material
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances the world and returns how many internal steps ran.
    ///
    /// An `elapsed` of zero runs exactly one step of `fixed_step`.
    pub fn step(&mut self, fixed_step: f32, elapsed: f32, max_substeps: u32) -> u32 {
        if elapsed <= 0.0 {
            self.internal_step(fixed_step);
            return 1;
        }

        self.accumulator += elapsed;
        let mut substeps = 0;
        while self.accumulator >= fixed_step && substeps < max_substeps {
            self.internal_step(fixed_step);
            self.accumulator -= fixed_step;
            substeps += 1;
        }
        self.accumulator %= fixed_step;

        substeps
    }

    pub fn internal_step(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            body.velocity += gravity * dt;
        }

        let mut contacts = detect_contacts(&self.bodies);
        if !contacts.is_empty() {
            solve_contacts(
                &mut self.bodies,
                &mut contacts,
                &self.default_contact_material,
                dt,
                self.solver_iterations,
            );
        }

        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            integrate(body, dt);
        }

        self.time += dt;
    }
}

fn integrate(body: &mut Body, dt: f32) {
    body.velocity *= (1.0 - body.linear_damping).powf(dt);
    body.angular_velocity *= (1.0 - body.angular_damping).powf(dt);

    body.position += body.velocity * dt;

    let rotation = Quat::from_scaled_axis(body.angular_velocity * dt);
    body.orientation = (rotation * body.orientation).normalize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FIXED_STEP: f32 = 1.0 / 60.0;

    fn falling_world() -> (World, BodyHandle) {
        let mut world = World::new();
        world.set_gravity([0.0, -9.82, 0.0]);
        let sphere = world.add_body(Body::new_sphere([0.0, 10.0, 0.0], 0.5, 1.0));
        (world, sphere)
    }

    #[test]
    fn test_zero_elapsed_runs_one_step() {
        let (mut world, _) = falling_world();
        assert_eq!(world.step(FIXED_STEP, 0.0, 3), 1);
        assert_relative_eq!(world.time(), FIXED_STEP);
    }

    #[test]
    fn test_partial_step_accumulates() {
        let (mut world, _) = falling_world();
        assert_eq!(world.step(FIXED_STEP, FIXED_STEP * 0.6, 3), 0);
        assert_eq!(world.step(FIXED_STEP, FIXED_STEP * 0.6, 3), 1);
    }

    #[test]
    fn test_substeps_are_capped_and_excess_dropped() {
        let (mut world, _) = falling_world();
        assert_eq!(world.step(FIXED_STEP, FIXED_STEP * 10.5, 3), 3);
        // Only the half-step remainder carries over.
        assert_eq!(world.step(FIXED_STEP, FIXED_STEP * 0.25, 3), 0);
        assert_relative_eq!(world.time(), FIXED_STEP * 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gravity_accelerates_dynamic_bodies() {
        let (mut world, sphere) = falling_world();
        world.internal_step(FIXED_STEP);
        let body = world.body(sphere).unwrap();
        assert!(body.velocity.y < 0.0);
        assert!(body.position.y < 10.0);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let mut world = World::new();
        world.set_gravity([0.0, -9.82, 0.0]);
        let fixed = world.add_body(Body::new_static_sphere([1.0, 2.0, 3.0], 1.0));
        for _ in 0..120 {
            world.internal_step(FIXED_STEP);
        }
        assert_eq!(world.body(fixed).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_unknown_handle_is_none() {
        let world = World::new();
        assert!(world.body(BodyHandle(3)).is_none());
    }
}
