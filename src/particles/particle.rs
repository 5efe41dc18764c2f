use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::physics::{DEFAULT_BOUNCING, DEFAULT_MASS, DEFAULT_RADIUS};
use crate::error::{invalid_properties, SimulationResult};

/// Point-mass particle slot.
///
/// `previous_position` carries the implicit Verlet velocity; `velocity` is the
/// cached explicit value used by collision response and rendering. A slot with
/// `lifetime <= 0` is free.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Position in world space
    pub position: Vec3,
    /// Position one step ago
    pub previous_position: Vec3,
    /// Velocity
    pub velocity: Vec3,
    /// Velocity one step ago
    pub previous_velocity: Vec3,
    /// Accumulated external force
    pub force: Vec3,
    /// Remaining lifetime (seconds)
    pub lifetime: f32,
}

impl Particle {
    /// Create a live particle whose previous position is back-extrapolated by
    /// one step, so the first Verlet step reproduces `velocity`.
    pub fn new(position: Vec3, velocity: Vec3, force: Vec3, lifetime: f32, dt: f32) -> Self {
        Self {
            position,
            previous_position: position - velocity * dt,
            velocity,
            previous_velocity: velocity,
            force,
            lifetime,
        }
    }

    /// Check if particle is alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }

    /// Move the particle and re-derive the implicit velocity from its cached
    /// velocity, keeping the next Verlet step consistent.
    pub fn teleport(&mut self, position: Vec3, dt: f32) {
        self.position = position;
        self.previous_position = position - self.velocity * dt;
    }
}

/// Properties shared by every particle of a simulation session.
///
/// One instance per session, not per particle: a change applies to all
/// particles from the next step on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleProperties {
    /// Mass, > 0
    pub mass: f32,
    /// Collision radius, >= 0
    pub radius: f32,
    /// Restitution coefficient, conventionally in [0, 1]
    pub bouncing: f32,
}

impl ParticleProperties {
    pub fn new(mass: f32, radius: f32, bouncing: f32) -> SimulationResult<Self> {
        let properties = Self { mass, radius, bouncing };
        properties.validate()?;
        Ok(properties)
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(invalid_properties(format!("mass must be > 0, got {}", self.mass)));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(invalid_properties(format!("radius must be >= 0, got {}", self.radius)));
        }
        if !self.bouncing.is_finite() || self.bouncing < 0.0 {
            return Err(invalid_properties(format!(
                "bouncing must be finite and >= 0, got {}",
                self.bouncing
            )));
        }
        Ok(())
    }
}

impl Default for ParticleProperties {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            radius: DEFAULT_RADIUS,
            bouncing: DEFAULT_BOUNCING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_back_extrapolates() {
        let dt = 0.1;
        let particle = Particle::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 1.0, dt);

        assert!(particle.is_alive());
        assert!((particle.previous_position.x + 0.2).abs() < 1e-6);
        assert_eq!(particle.previous_velocity, particle.velocity);
    }

    #[test]
    fn test_default_slot_is_dead() {
        assert!(!Particle::default().is_alive());
    }

    #[test]
    fn test_properties_validation() {
        assert!(ParticleProperties::new(1.0, 0.1, 0.5).is_ok());
        assert!(ParticleProperties::new(0.0, 0.1, 0.5).is_err());
        assert!(ParticleProperties::new(-1.0, 0.1, 0.5).is_err());
        assert!(ParticleProperties::new(1.0, -0.1, 0.5).is_err());
        assert!(ParticleProperties::new(1.0, 0.1, f32::NAN).is_err());
        // radius 0 is a point particle
        assert!(ParticleProperties::new(1.0, 0.0, 0.0).is_ok());
    }
}
