use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::simulation::{DEFAULT_K_VERLET, DEFAULT_MAX_PARTICLES, FIXED_TIMESTEP, MIN_K_VERLET};
use crate::error::{invalid_config, SimulationError, SimulationResult};
use crate::particles::ParticleProperties;
use crate::physics::SolverKind;

/// Simulation session configuration
///
/// Every field has a default, so a TOML file only needs the values it
/// changes:
///
/// ```toml
/// timestep = 0.008333
/// max_particles = 4096
///
/// [properties]
/// radius = 0.02
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation timestep (seconds)
    pub timestep: f32,
    /// Verlet damping, in [MIN_K_VERLET, 1]
    pub k_verlet: f32,
    pub solver: SolverKind,
    /// Particle store capacity
    pub max_particles: usize,
    pub properties: ParticleProperties,
    /// Clamp on a single frame delta fed to the accumulator
    pub max_frame_time: Option<f32>,
    /// Dedicated kernel threads; None = rayon global pool, 0 = one per core
    pub worker_threads: Option<usize>,
    /// Emission RNG seed; None = OS entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: FIXED_TIMESTEP,
            k_verlet: DEFAULT_K_VERLET,
            solver: SolverKind::Verlet,
            max_particles: DEFAULT_MAX_PARTICLES,
            properties: ParticleProperties::default(),
            max_frame_time: None,
            worker_threads: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> SimulationResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(SimulationError::InvalidTimestep { timestep: self.timestep });
        }
        if !(MIN_K_VERLET..=1.0).contains(&self.k_verlet) {
            return Err(invalid_config(
                "k_verlet",
                format!("{} outside [{}, 1.0]", self.k_verlet, MIN_K_VERLET),
            ));
        }
        if let Some(max) = self.max_frame_time {
            if !(max.is_finite() && max >= self.timestep) {
                return Err(invalid_config(
                    "max_frame_time",
                    format!("{} must be >= timestep {}", max, self.timestep),
                ));
            }
        }
        self.properties.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solver, SolverKind::Verlet);
    }

    #[test]
    fn test_partial_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            max_particles = 64
            solver = "EulerSemiImplicit"
            seed = 42

            [properties]
            radius = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.max_particles, 64);
        assert_eq!(config.solver, SolverKind::EulerSemiImplicit);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.properties.radius, 0.2);
        assert_eq!(config.properties.mass, ParticleProperties::default().mass);
        assert_eq!(config.timestep, FIXED_TIMESTEP);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("timestep = 0.0"),
            Err(SimulationError::InvalidTimestep { .. })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("k_verlet = 1.5"),
            Err(SimulationError::InvalidConfig { field: "k_verlet", .. })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[properties]\nmass = -2.0"),
            Err(SimulationError::InvalidProperties { .. })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("max_particles = \"many\""),
            Err(SimulationError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_particles = 10\nk_verlet = 0.99").unwrap();

        let config = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(config.max_particles, 10);
        assert_eq!(config.k_verlet, 0.99);

        assert!(matches!(
            SimulationConfig::load("/nonexistent/particles.toml"),
            Err(SimulationError::Io(_))
        ));
    }
}
