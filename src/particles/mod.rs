pub mod emitter;
pub mod particle;
pub mod particle_data;
pub mod string;

pub use emitter::{EmissionShape, Emitter};
pub use particle::{Particle, ParticleProperties};
pub use particle_data::ParticleStore;
pub use string::{ParticleString, StringConfig};
