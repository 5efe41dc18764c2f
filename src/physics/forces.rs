use glam::Vec3;
use rayon::prelude::*;

use crate::constants::simulation::PARALLEL_BATCH_SIZE;
use crate::constants::string::MIN_LINK_LENGTH;
use crate::particles::Particle;

/// Damped spring connecting two neighbouring particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Rest length
    pub rest_length: f32,
    /// Stiffness
    pub elasticity: f32,
    /// Damping along the link
    pub damping: f32,
}

/// Force exerted on `p` by the spring linking it to `other`
#[inline]
pub fn spring_force(p: &Particle, other: &Particle, spring: &SpringParams) -> Vec3 {
    let delta = other.position - p.position;
    let length = delta.length();
    if length < MIN_LINK_LENGTH {
        return Vec3::ZERO;
    }
    let direction = delta / length;
    let stretch = spring.elasticity * (length - spring.rest_length);
    let relative_speed = spring.damping * (other.velocity - p.velocity).dot(direction);
    (stretch + relative_speed) * direction
}

/// Recompute the force of every particle of a chain: gravity plus the springs
/// to its previous and next neighbour. Pinned particles get no force.
///
/// Neighbour reads make this the one pass that is not slot-local, so forces
/// are computed into `scratch` from an immutable view, then written back.
pub fn solve_chain_forces(
    particles: &mut [Particle],
    pinned: &[bool],
    spring: &SpringParams,
    gravity: f32,
    mass: f32,
    scratch: &mut Vec<Vec3>,
) {
    debug_assert_eq!(particles.len(), pinned.len());

    let weight = mass * Vec3::new(0.0, -gravity, 0.0);
    scratch.clear();
    scratch.resize(particles.len(), Vec3::ZERO);

    let view: &[Particle] = particles;
    scratch
        .par_iter_mut()
        .with_min_len(PARALLEL_BATCH_SIZE)
        .enumerate()
        .for_each(|(i, force)| {
            if pinned[i] {
                *force = Vec3::ZERO;
                return;
            }
            let p = &view[i];
            let mut total = weight;
            if i > 0 {
                total += spring_force(p, &view[i - 1], spring);
            }
            if i + 1 < view.len() {
                total += spring_force(p, &view[i + 1], spring);
            }
            *force = total;
        });

    particles
        .par_iter_mut()
        .zip(scratch.par_iter())
        .for_each(|(p, force)| p.force = *force);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(position: Vec3) -> Particle {
        Particle {
            position,
            lifetime: 1.0,
            ..Particle::default()
        }
    }

    const SPRING: SpringParams = SpringParams {
        rest_length: 1.0,
        elasticity: 10.0,
        damping: 0.0,
    };

    #[test]
    fn test_spring_at_rest_length() {
        let force = spring_force(&at(Vec3::ZERO), &at(Vec3::X), &SPRING);
        assert!(force.length() < 1e-6);
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let a = at(Vec3::ZERO);
        let b = at(Vec3::X * 2.0);
        let on_a = spring_force(&a, &b, &SPRING);
        let on_b = spring_force(&b, &a, &SPRING);

        assert!((on_a - Vec3::X * 10.0).length() < 1e-5);
        assert!((on_a + on_b).length() < 1e-5);
    }

    #[test]
    fn test_damping_opposes_separation() {
        let spring = SpringParams { damping: 2.0, ..SPRING };
        let a = at(Vec3::ZERO);
        let mut b = at(Vec3::X);
        b.velocity = Vec3::X;

        let on_a = spring_force(&a, &b, &spring);
        assert!((on_a.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_chain_forces() {
        let mut particles = vec![at(Vec3::ZERO), at(Vec3::X * 2.0), at(Vec3::X * 3.0)];
        let pinned = vec![true, false, false];
        let mut scratch = Vec::new();

        solve_chain_forces(&mut particles, &pinned, &SPRING, 10.0, 1.0, &mut scratch);

        assert_eq!(particles[0].force, Vec3::ZERO);
        // Middle: pulled back by the stretched first link, gravity down
        assert!((particles[1].force - Vec3::new(-10.0, -10.0, 0.0)).length() < 1e-4);
        // Last link is at rest length
        assert!((particles[2].force - Vec3::new(0.0, -10.0, 0.0)).length() < 1e-4);
    }
}
