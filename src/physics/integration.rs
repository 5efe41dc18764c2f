use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::simulation::{LIFETIME_STEP_TOLERANCE, PARALLEL_BATCH_SIZE};
use crate::particles::Particle;

/// Movement kernel selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Position update from the old velocity, then velocity update
    EulerExplicit,
    /// Velocity update first, position from the new velocity
    EulerSemiImplicit,
    /// Position-based Verlet with `k_verlet` damping
    #[default]
    Verlet,
}

/// Advance every live particle by one fixed step.
///
/// Dead slots are left untouched. Each particle only reads and writes its own
/// slot, so the pass runs as a plain parallel map.
pub fn integrate(particles: &mut [Particle], solver: SolverKind, k_verlet: f32, dt: f32, mass: f32) {
    assert!(dt > 0.0, "integration timestep must be > 0, got {}", dt);
    assert!(mass > 0.0, "particle mass must be > 0, got {}", mass);

    particles
        .par_iter_mut()
        .with_min_len(PARALLEL_BATCH_SIZE)
        .filter(|p| p.is_alive())
        .for_each(|p| match solver {
            SolverKind::Verlet => verlet_step(p, k_verlet, dt, mass),
            SolverKind::EulerExplicit => euler_explicit_step(p, dt, mass),
            SolverKind::EulerSemiImplicit => euler_semi_implicit_step(p, dt, mass),
        });
}

#[inline]
pub fn verlet_step(p: &mut Particle, k_verlet: f32, dt: f32, mass: f32) {
    let position = p.position + k_verlet * (p.position - p.previous_position) + (dt * dt) * p.force / mass;
    let velocity = (position - p.position) / dt;
    commit(p, position, velocity, dt);
}

#[inline]
fn euler_explicit_step(p: &mut Particle, dt: f32, mass: f32) {
    let position = p.position + p.velocity * dt;
    let velocity = p.velocity + p.force / mass * dt;
    commit(p, position, velocity, dt);
}

#[inline]
fn euler_semi_implicit_step(p: &mut Particle, dt: f32, mass: f32) {
    let velocity = p.velocity + p.force / mass * dt;
    let position = p.position + velocity * dt;
    commit(p, position, velocity, dt);
}

/// Shift current state into `previous_*` and age the particle
#[inline]
fn commit(p: &mut Particle, position: Vec3, velocity: Vec3, dt: f32) {
    p.previous_position = p.position;
    p.previous_velocity = p.velocity;
    p.position = position;
    p.velocity = velocity;
    p.lifetime = age(p.lifetime, dt);
}

/// Remaining lifetime after one step, never negative
#[inline]
pub fn age(lifetime: f32, dt: f32) -> f32 {
    let remaining = lifetime - dt;
    if remaining <= dt * LIFETIME_STEP_TOLERANCE {
        0.0
    } else {
        remaining
    }
}
