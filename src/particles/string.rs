use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::physics::GRAVITY;
use crate::constants::string::{DEFAULT_DAMPING, DEFAULT_ELASTICITY, DEFAULT_SPACING};
use crate::particles::{Particle, ParticleProperties, ParticleStore};
use crate::physics::{integrate, solve_chain_forces, solve_collisions, ObstacleCache, SolverKind, SpringParams};

/// Layout and spring parameters of a particle string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringConfig {
    /// Number of particles in the chain
    pub particle_count: usize,
    /// Rest distance between neighbours
    pub spacing: f32,
    /// Direction the chain is laid out along from its origin
    pub direction: Vec3,
    pub elasticity: f32,
    pub damping: f32,
    /// Gravity magnitude applied along -Y
    pub gravity: f32,
}

impl Default for StringConfig {
    fn default() -> Self {
        Self {
            particle_count: 16,
            spacing: DEFAULT_SPACING,
            direction: Vec3::X,
            elasticity: DEFAULT_ELASTICITY,
            damping: DEFAULT_DAMPING,
            gravity: GRAVITY,
        }
    }
}

/// Chain of immortal particles linked by damped springs.
///
/// Pinned particles stay at their anchor; the rest follow gravity, springs
/// and the shared obstacle primitives.
#[derive(Debug)]
pub struct ParticleString {
    store: ParticleStore,
    pinned: Vec<bool>,
    anchors: Vec<Vec3>,
    config: StringConfig,
    scratch: Vec<Vec3>,
}

impl ParticleString {
    pub fn new(origin: Vec3, config: StringConfig, dt: f32) -> Self {
        let direction = config.direction.normalize_or_zero();
        let mut store = ParticleStore::new(config.particle_count);
        for i in 0..config.particle_count {
            let position = origin + direction * config.spacing * i as f32;
            store.set(i, Particle::new(position, Vec3::ZERO, Vec3::ZERO, f32::INFINITY, dt));
        }

        let anchors = store.instances().map(|(position, _)| position).collect();
        Self {
            store,
            pinned: vec![false; config.particle_count],
            anchors,
            config,
            scratch: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &StringConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pinned[index]
    }

    /// Pin or release a particle; a pinned particle is anchored where it is now
    pub fn set_pinned(&mut self, index: usize, pinned: bool) {
        self.pinned[index] = pinned;
        if pinned {
            let p = self.store.get_mut(index);
            self.anchors[index] = p.position;
            p.velocity = Vec3::ZERO;
            p.previous_position = p.position;
        }
    }

    pub fn toggle_pinned(&mut self, index: usize) {
        let pinned = !self.pinned[index];
        self.set_pinned(index, pinned);
    }

    pub fn particle_position(&self, index: usize) -> Vec3 {
        self.store.get(index).position
    }

    /// Move a particle; pinned particles take the new position as anchor
    pub fn set_particle_position(&mut self, index: usize, position: Vec3, dt: f32) {
        self.store.get_mut(index).teleport(position, dt);
        if self.pinned[index] {
            self.anchors[index] = position;
        }
    }

    /// One fixed step: forces, movement, pins, collisions.
    /// Returns the number of particles that collided.
    pub fn step(
        &mut self,
        obstacles: &ObstacleCache,
        properties: &ParticleProperties,
        solver: SolverKind,
        k_verlet: f32,
        dt: f32,
    ) -> usize {
        let spring = SpringParams {
            rest_length: self.config.spacing,
            elasticity: self.config.elasticity,
            damping: self.config.damping,
        };
        let particles = self.store.as_mut_slice();

        solve_chain_forces(
            particles,
            &self.pinned,
            &spring,
            self.config.gravity,
            properties.mass,
            &mut self.scratch,
        );
        integrate(particles, solver, k_verlet, dt, properties.mass);

        for ((p, pinned), anchor) in particles.iter_mut().zip(&self.pinned).zip(&self.anchors) {
            if *pinned {
                p.position = *anchor;
                p.previous_position = *anchor;
                p.velocity = Vec3::ZERO;
            }
        }

        solve_collisions(particles, obstacles, properties, dt)
    }

    /// Free the chain storage. Calling it again is a no-op.
    pub fn release(&mut self) {
        self.store.release();
        self.pinned = Vec::new();
        self.anchors = Vec::new();
        self.scratch = Vec::new();
    }
}
