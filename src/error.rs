//! Simulation error handling
//!
//! Configuration entry points validate their input and report problems through
//! `SimulationError`. Kernel preconditions (positive timestep, positive mass,
//! in-range indices) are programmer errors and panic instead.

/// Type alias for simulation results
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid particle properties: {reason}")]
    InvalidProperties { reason: String },

    #[error("Invalid timestep: {timestep} (must be finite and > 0)")]
    InvalidTimestep { timestep: f32 },

    #[error("Invalid configuration field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Thread pool creation failed: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse failed: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Create an invalid properties error
pub fn invalid_properties(reason: impl std::fmt::Display) -> SimulationError {
    SimulationError::InvalidProperties {
        reason: reason.to_string(),
    }
}

/// Create an invalid config error
pub fn invalid_config(field: &'static str, reason: impl std::fmt::Display) -> SimulationError {
    SimulationError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
