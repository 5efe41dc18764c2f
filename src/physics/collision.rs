use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;
use rayon::prelude::*;

use crate::constants::physics::PLANE_CONTACT_TOLERANCE;
use crate::constants::simulation::PARALLEL_BATCH_SIZE;
use crate::particles::{Particle, ParticleProperties};
use crate::physics::obstacle::{ObstacleCache, PlanePrimitive, SpherePrimitive, TrianglePrimitive};

/// Resolve collisions of every live particle against the cached primitives.
///
/// O(particles × primitives). Planes are applied one after another in
/// obstacle order; simultaneous contacts are not solved jointly. Returns the
/// number of particles that hit at least one primitive.
pub fn solve_collisions(
    particles: &mut [Particle],
    obstacles: &ObstacleCache,
    properties: &ParticleProperties,
    dt: f32,
) -> usize {
    assert!(dt > 0.0, "collision timestep must be > 0, got {}", dt);

    let collided = AtomicUsize::new(0);
    particles
        .par_iter_mut()
        .with_min_len(PARALLEL_BATCH_SIZE)
        .filter(|p| p.is_alive())
        .for_each(|p| {
            if collide_particle(p, obstacles, properties, dt) {
                collided.fetch_add(1, Ordering::Relaxed);
            }
        });
    collided.into_inner()
}

/// Per-kind dispatch for one particle. Returns whether anything was hit.
pub fn collide_particle(
    p: &mut Particle,
    obstacles: &ObstacleCache,
    properties: &ParticleProperties,
    dt: f32,
) -> bool {
    let mut collision = false;

    for plane in obstacles.planes() {
        if is_crossing_plane(p, plane, properties.radius) {
            collide_plane(p, plane, properties);
            collision = true;
        }
    }
    for sphere in obstacles.spheres() {
        collision |= collide_sphere(p, sphere, properties);
    }
    for triangle in obstacles.triangles() {
        collision |= collide_triangle(p, triangle, properties);
    }

    // Verlet derives velocity from the position delta, so the history has to
    // follow the post-collision velocity
    if collision {
        p.previous_position = p.position - p.velocity * dt;
    }
    collision
}

/// Signed distance of the particle surface point facing the plane
#[inline]
fn surface_distance(center: Vec3, plane: &PlanePrimitive, radius: f32) -> f32 {
    plane.signed_distance(center - plane.normal * radius)
}

/// True when the particle surface changed side (or touched) since last step.
/// A particle moving into the plane whose previous position lies within
/// `PLANE_CONTACT_TOLERANCE` behind it is still in resting contact.
#[inline]
pub fn is_crossing_plane(p: &Particle, plane: &PlanePrimitive, radius: f32) -> bool {
    let now = surface_distance(p.position, plane, radius);
    let before = surface_distance(p.previous_position, plane, radius);
    if now * before <= 0.0 {
        return true;
    }
    now < 0.0 && before > -PLANE_CONTACT_TOLERANCE && p.velocity.dot(plane.normal) <= 0.0
}

/// Restitutive bounce plus tangential friction, then push back above the plane
#[inline]
pub fn collide_plane(p: &mut Particle, plane: &PlanePrimitive, properties: &ParticleProperties) {
    let n = plane.normal;
    let restitution = 1.0 + properties.bouncing;

    let velocity_normal = p.velocity.dot(n) * n;
    let velocity_tangent = p.velocity - velocity_normal;

    p.velocity -= restitution * velocity_normal;
    p.velocity -= plane.friction * velocity_tangent;

    p.position -= restitution * surface_distance(p.position, plane, properties.radius) * n;
}

/// Sphere response slot. No-op until sphere primitives carry geometry.
#[inline]
fn collide_sphere(_p: &mut Particle, _sphere: &SpherePrimitive, _properties: &ParticleProperties) -> bool {
    false
}

/// Triangle response slot. No-op until triangle primitives carry geometry.
#[inline]
fn collide_triangle(_p: &mut Particle, _triangle: &TrianglePrimitive, _properties: &ParticleProperties) -> bool {
    false
}
