//! Fixed-step particle simulation core.
//!
//! Particles live in a fixed-capacity store and are spawned from emitters,
//! moved by a parallel integrator and bounced off obstacle planes. Rendering
//! and input are left to the host; it feeds frame deltas through
//! [`ParticleSimulation::advance`] and reads positions back.

pub mod config;
pub mod constants;
pub mod error;
pub mod particles;
pub mod physics;
pub mod simulation;
pub mod thread_pool;
pub mod time;

pub use config::SimulationConfig;
pub use error::{SimulationError, SimulationResult};
pub use particles::{EmissionShape, Emitter, Particle, ParticleProperties, ParticleStore, ParticleString, StringConfig};
pub use physics::{Obstacle, ObstacleCache, SolverKind};
pub use simulation::{ParticleSimulation, StepStats};
pub use thread_pool::KernelPool;
pub use time::FixedStepAccumulator;
