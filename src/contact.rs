//! Contact generation and sequential-impulse resolution.
//!
//! Normals point from body B toward body A, so a negative relative
//! normal velocity means the pair is approaching.

use crate::body::{Body, Shape};
use glam::Vec3;

/// Approach speeds below this bounce with zero restitution so resting
/// contacts settle instead of jittering.
const RESTITUTION_THRESHOLD: f32 = 1.0;
const BAUMGARTE: f32 = 0.2;
const PENETRATION_SLOP: f32 = 0.005;

/// Friction and restitution applied when two shapes collide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Contact {
    pub body_a: usize,
    pub body_b: usize,
    pub normal: Vec3,
    pub depth: f32,
    pub point: Vec3,
    ra: Vec3,
    rb: Vec3,
    normal_impulse: f32,
    tangent_impulse: Vec3,
    target_normal_velocity: f32,
    normal_mass: f32,
}

impl Contact {
    pub const MAX_CONTACTS: usize = 1000;

    fn new(body_a: usize, body_b: usize, normal: Vec3, depth: f32, point: Vec3, ra: Vec3, rb: Vec3) -> Self {
        Self {
            body_a,
            body_b,
            normal,
            depth,
            point,
            ra,
            rb,
            normal_impulse: 0.0,
            tangent_impulse: Vec3::ZERO,
            target_normal_velocity: 0.0,
            normal_mass: 0.0,
        }
    }
}

/// Finds every penetrating pair. Static/static pairs are skipped.
pub fn detect_contacts(bodies: &[Body]) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            if bodies[i].is_static() && bodies[j].is_static() {
                continue;
            }
            if contacts.len() >= Contact::MAX_CONTACTS {
                log::warn!("Contact limit of {} reached", Contact::MAX_CONTACTS);
                return contacts;
            }
            if let Some(contact) = collide(bodies, i, j) {
                contacts.push(contact);
            }
        }
    }

    contacts
}

fn collide(bodies: &[Body], i: usize, j: usize) -> Option<Contact> {
    match (bodies[i].shape(), bodies[j].shape()) {
        (Shape::Sphere { radius }, Shape::Plane) => sphere_plane(bodies, i, radius, j),
        (Shape::Plane, Shape::Sphere { radius }) => sphere_plane(bodies, j, radius, i),
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(bodies, i, ra, j, rb)
        }
        (Shape::Plane, Shape::Plane) => None,
    }
}

fn sphere_plane(bodies: &[Body], sphere: usize, radius: f32, plane: usize) -> Option<Contact> {
    let normal = bodies[plane].plane_normal()?;
    let distance = (bodies[sphere].position - bodies[plane].position).dot(normal) - radius;
    if distance >= 0.0 {
        return None;
    }

    let ra = -normal * radius;
    let point = bodies[sphere].position + ra;
    let rb = point - bodies[plane].position;
    Some(Contact::new(sphere, plane, normal, -distance, point, ra, rb))
}

fn sphere_sphere(bodies: &[Body], a: usize, ra: f32, b: usize, rb: f32) -> Option<Contact> {
    let offset = bodies[a].position - bodies[b].position;
    let distance = offset.length();
    if distance >= ra + rb {
        return None;
    }

    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec3::Y
    };
    let point = bodies[b].position + normal * rb;
    Some(Contact::new(a, b, normal, ra + rb - distance, point, -normal * ra, normal * rb))
}

/// Resolves contacts in place on `bodies` with `iterations` solver passes.
pub fn solve_contacts(
    bodies: &mut [Body],
    contacts: &mut [Contact],
    material: &ContactMaterial,
    dt: f32,
    iterations: usize,
) {
    for contact in contacts.iter_mut() {
        let (a, b) = (&bodies[contact.body_a], &bodies[contact.body_b]);
        let approach = relative_velocity(a, b, contact).dot(contact.normal);
        let bounce = if -approach > RESTITUTION_THRESHOLD {
            -material.restitution * approach
        } else {
            0.0
        };
        let bias = BAUMGARTE / dt * (contact.depth - PENETRATION_SLOP).max(0.0);

        contact.target_normal_velocity = bounce.max(bias);
        contact.normal_mass = effective_mass(a, b, contact.ra, contact.rb, contact.normal);
    }

    for _ in 0..iterations {
        for contact in contacts.iter_mut() {
            let (a, b) = pair_mut(bodies, contact.body_a, contact.body_b);
            solve_normal(a, b, contact);
            solve_friction(a, b, contact, material.friction);
        }
    }
}

fn solve_normal(a: &mut Body, b: &mut Body, contact: &mut Contact) {
    if contact.normal_mass <= 0.0 {
        return;
    }
    let normal_velocity = relative_velocity(a, b, contact).dot(contact.normal);
    let delta = (contact.target_normal_velocity - normal_velocity) / contact.normal_mass;

    let accumulated = (contact.normal_impulse + delta).max(0.0);
    let applied = accumulated - contact.normal_impulse;
    contact.normal_impulse = accumulated;

    let impulse = contact.normal * applied;
    a.apply_impulse(impulse, contact.ra);
    b.apply_impulse(-impulse, contact.rb);
}

fn solve_friction(a: &mut Body, b: &mut Body, contact: &mut Contact, friction: f32) {
    let velocity = relative_velocity(a, b, contact);
    let tangential = velocity - contact.normal * velocity.dot(contact.normal);
    let speed = tangential.length();
    if speed <= f32::EPSILON {
        return;
    }

    let tangent = tangential / speed;
    let tangent_mass = effective_mass(a, b, contact.ra, contact.rb, tangent);
    if tangent_mass <= 0.0 {
        return;
    }

    let max_impulse = friction * contact.normal_impulse;
    let mut accumulated = contact.tangent_impulse - tangent * (speed / tangent_mass);
    if accumulated.length() > max_impulse {
        accumulated = accumulated.normalize_or_zero() * max_impulse;
    }
    let applied = accumulated - contact.tangent_impulse;
    contact.tangent_impulse = accumulated;

    a.apply_impulse(applied, contact.ra);
    b.apply_impulse(-applied, contact.rb);
}

fn relative_velocity(a: &Body, b: &Body, contact: &Contact) -> Vec3 {
    a.velocity_at(contact.ra) - b.velocity_at(contact.rb)
}

fn effective_mass(a: &Body, b: &Body, ra: Vec3, rb: Vec3, direction: Vec3) -> f32 {
    a.inv_mass()
        + b.inv_mass()
        + a.inv_inertia() * ra.cross(direction).length_squared()
        + b.inv_inertia() * rb.cross(direction).length_squared()
}

fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Quat;

    fn floor() -> Body {
        Body::new_plane([0.0, 0.0, 0.0])
            .with_orientation(Quat::from_axis_angle(Vec3::X, -std::f32::consts::FRAC_PI_2))
    }

    #[test]
    fn test_sphere_above_plane_has_no_contact() {
        let bodies = vec![Body::new_sphere([0.0, 1.0, 0.0], 0.5, 1.0), floor()];
        assert!(detect_contacts(&bodies).is_empty());
    }

    #[test]
    fn test_sphere_plane_penetration() {
        let bodies = vec![floor(), Body::new_sphere([0.0, 0.4, 0.0], 0.5, 1.0)];
        let contacts = detect_contacts(&bodies);
        assert_eq!(contacts.len(), 1);

        let contact = &contacts[0];
        assert_eq!(contact.body_a, 1);
        assert_eq!(contact.body_b, 0);
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1e-5);
        assert_relative_eq!(contact.normal.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(contact.point.y, -0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_overlapping_spheres() {
        let bodies = vec![
            Body::new_sphere([0.0, 0.0, 0.0], 0.5, 1.0),
            Body::new_sphere([0.8, 0.0, 0.0], 0.5, 1.0),
        ];
        let contacts = detect_contacts(&bodies);
        assert_eq!(contacts.len(), 1);
        assert_relative_eq!(contacts[0].depth, 0.2, epsilon = 1e-5);
        assert_relative_eq!(contacts[0].normal.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_restitution_reverses_approach_velocity() {
        let mut bodies = vec![
            Body::new_sphere([0.0, 0.49, 0.0], 0.5, 1.0).with_velocity([0.0, -5.0, 0.0]),
            floor(),
        ];
        let mut contacts = detect_contacts(&bodies);
        let material = ContactMaterial {
            friction: 0.1,
            restitution: 0.7,
        };
        solve_contacts(&mut bodies, &mut contacts, &material, 1.0 / 60.0, 10);

        assert_relative_eq!(bodies[0].velocity.y, 3.5, epsilon = 1e-3);
        assert_eq!(bodies[1].velocity, Vec3::ZERO);
    }

    #[test]
    fn test_slow_contact_does_not_bounce() {
        let mut bodies = vec![
            Body::new_sphere([0.0, 0.499, 0.0], 0.5, 1.0).with_velocity([0.0, -0.2, 0.0]),
            floor(),
        ];
        let mut contacts = detect_contacts(&bodies);
        solve_contacts(&mut bodies, &mut contacts, &ContactMaterial::default(), 1.0 / 60.0, 10);
        assert!(bodies[0].velocity.y.abs() < 1e-4);
    }

    #[test]
    fn test_friction_spins_sliding_sphere() {
        let mut bodies = vec![
            Body::new_sphere([0.0, 0.49, 0.0], 0.5, 1.0).with_velocity([2.0, -2.0, 0.0]),
            floor(),
        ];
        let mut contacts = detect_contacts(&bodies);
        let material = ContactMaterial {
            friction: 0.1,
            restitution: 0.0,
        };
        solve_contacts(&mut bodies, &mut contacts, &material, 1.0 / 60.0, 10);

        assert!(bodies[0].velocity.x < 2.0);
        // Sliding along +X with the floor below rolls the sphere about -Z.
        assert!(bodies[0].angular_velocity.z < 0.0);
    }
}
