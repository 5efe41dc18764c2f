// Verlet Particles Constants
//
// Default values shared by the configuration layer, the kernels and the
// particle string builder. Tunables live in `SimulationConfig`; these are the
// values it falls back to.

/// Simulation timing and integration defaults
pub mod simulation {
    /// Fixed simulation timestep (seconds), 60 Hz
    pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

    /// Verlet damping coefficient. 1.0 means no damping.
    pub const DEFAULT_K_VERLET: f32 = 1.0;

    /// Lowest damping coefficient accepted by the configuration layer
    pub const MIN_K_VERLET: f32 = 0.9;

    /// A remaining lifetime below this fraction of a step expires the particle.
    /// Covers the f32 rounding left when a lifetime of up to a few hundred
    /// steps is a whole number of steps; anything larger is a real partial step.
    pub const LIFETIME_STEP_TOLERANCE: f32 = 1e-3;

    /// Minimum particles per rayon task in the kernels
    pub const PARALLEL_BATCH_SIZE: usize = 64;

    /// Default particle store capacity
    pub const DEFAULT_MAX_PARTICLES: usize = 1024;
}

/// Physical defaults
pub mod physics {
    /// Gravitational acceleration magnitude (m/s²), applied along -Y
    pub const GRAVITY: f32 = 9.81;

    /// Default particle mass (kg)
    pub const DEFAULT_MASS: f32 = 1.0;

    /// Default particle radius (m)
    pub const DEFAULT_RADIUS: f32 = 0.05;

    /// Default restitution coefficient
    pub const DEFAULT_BOUNCING: f32 = 0.2;

    /// Depth (m) below a plane at which a particle resting on it still counts
    /// as touching; absorbs rounding left by the push-out
    pub const PLANE_CONTACT_TOLERANCE: f32 = 1e-4;
}

/// Emission shape constants
pub mod emission {
    /// Explosion particles start this far from the origin along their direction
    pub const EXPLOSION_START_OFFSET: f32 = 0.01;

    /// Half-width of the horizontal jitter applied to fountain/waterfall jets
    pub const JET_JITTER: f32 = 0.5;
}

/// Particle string defaults
pub mod string {
    /// Spring stiffness between neighbouring particles
    pub const DEFAULT_ELASTICITY: f32 = 1.0;

    /// Spring damping along the link direction
    pub const DEFAULT_DAMPING: f32 = 1.0;

    /// Rest distance between neighbouring particles (m)
    pub const DEFAULT_SPACING: f32 = 0.1;

    /// Links shorter than this are skipped by the force pass
    pub const MIN_LINK_LENGTH: f32 = 1e-6;
}
