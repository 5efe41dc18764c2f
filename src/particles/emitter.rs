use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::emission::{EXPLOSION_START_OFFSET, JET_JITTER};
use crate::constants::physics::GRAVITY;
use crate::particles::{Particle, ParticleProperties, ParticleStore};

/// Emission policy with its shape-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmissionShape {
    /// At the origin, at rest
    Point,
    /// Uniform directions over the full sphere
    Explosion { speed: f32 },
    /// Upward jet with horizontal jitter
    Fountain { speed: f32 },
    /// Downward jet starting `height` above the origin
    Waterfall { height: f32, speed: f32 },
    /// Uniform directions over the upper hemisphere, starting on its surface
    SemiSphere { radius: f32, speed: f32 },
}

/// Particle emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    /// Position in world space
    pub origin: Vec3,
    /// Emission shape
    pub shape: EmissionShape,
    /// Lifetime of spawned particles (seconds)
    pub lifetime: f32,
    /// Gravity magnitude applied along -Y
    pub gravity: f32,
}

impl Emitter {
    pub fn new(origin: Vec3, shape: EmissionShape) -> Self {
        Self {
            origin,
            shape,
            lifetime: 1.0,
            gravity: GRAVITY,
        }
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Initial `(position, velocity)` for one particle
    pub fn sample(&self, rng: &mut impl Rng) -> (Vec3, Vec3) {
        match self.shape {
            EmissionShape::Point => (self.origin, Vec3::ZERO),

            EmissionShape::Explosion { speed } => {
                let alpha = rng.gen_range(-180.0f32..180.0).to_radians();
                let beta = rng.gen_range(-90.0f32..90.0).to_radians();
                let direction = spherical_direction(alpha, beta);
                (self.origin + direction * EXPLOSION_START_OFFSET, direction * speed)
            }

            EmissionShape::Fountain { speed } => {
                let velocity = Vec3::new(
                    rng.gen_range(-JET_JITTER..JET_JITTER),
                    speed,
                    rng.gen_range(-JET_JITTER..JET_JITTER),
                );
                (self.origin, velocity)
            }

            EmissionShape::Waterfall { height, speed } => {
                let velocity = Vec3::new(
                    rng.gen_range(-JET_JITTER..JET_JITTER),
                    -speed,
                    rng.gen_range(-JET_JITTER..JET_JITTER),
                );
                (self.origin + Vec3::Y * height, velocity)
            }

            EmissionShape::SemiSphere { radius, speed } => {
                let alpha = rng.gen_range(-180.0f32..180.0).to_radians();
                let beta = rng.gen_range(0.0f32..90.0).to_radians();
                let direction = spherical_direction(alpha, beta);
                (self.origin + direction * radius, direction * speed)
            }
        }
    }

    /// Spawn one particle into the first free slot.
    ///
    /// Returns `false` and leaves the store untouched when no slot is free;
    /// the request is dropped, not queued.
    pub fn spawn(
        &self,
        store: &mut ParticleStore,
        properties: &ParticleProperties,
        dt: f32,
        rng: &mut impl Rng,
    ) -> bool {
        let Some(index) = store.find_free_slot() else {
            log::trace!("[Emitter] no free slot, spawn dropped");
            return false;
        };

        let (position, velocity) = self.sample(rng);
        let force = properties.mass * Vec3::new(0.0, -self.gravity, 0.0);
        store.set(index, Particle::new(position, velocity, force, self.lifetime, dt));
        true
    }
}

/// Unit vector from azimuth `alpha` and elevation `beta` (radians), Y up
fn spherical_direction(alpha: f32, beta: f32) -> Vec3 {
    Vec3::new(alpha.cos() * beta.cos(), beta.sin(), alpha.sin() * beta.cos())
}
