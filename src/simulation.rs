use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::particles::{Emitter, Particle, ParticleProperties, ParticleStore, ParticleString, StringConfig};
use crate::physics::{integrate, solve_collisions, Obstacle, ObstacleCache, SolverKind};
use crate::thread_pool::KernelPool;
use crate::time::FixedStepAccumulator;

/// Counters accumulated across steps
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepStats {
    pub steps: u64,
    pub spawned: u64,
    /// Spawn requests dropped for lack of a free slot
    pub dropped: u64,
    /// Particle-primitive contacts, counted once per particle per step
    pub collisions: u64,
}

/// One particle simulation session.
///
/// Owns the particle store, the shared particle properties, the obstacle list
/// and its primitive cache, any particle strings, and the fixed-step
/// accumulator. Configuration calls take `&mut self`, so they can only happen
/// between steps.
pub struct ParticleSimulation {
    config: SimulationConfig,
    store: ParticleStore,
    strings: Vec<ParticleString>,
    obstacles: Vec<Obstacle>,
    obstacle_cache: ObstacleCache,
    accumulator: FixedStepAccumulator,
    pool: KernelPool,
    rng: StdRng,
    stats: StepStats,
    released: bool,
}

impl ParticleSimulation {
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let pool = KernelPool::from_config(config.worker_threads)?;
        let accumulator = FixedStepAccumulator::new(config.timestep)?.with_max_frame_time(config.max_frame_time);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::info!(
            "Particle simulation created: {} slots, dt={:.5}s, solver={:?}, {} kernel threads",
            config.max_particles,
            config.timestep,
            config.solver,
            pool.thread_count()
        );

        Ok(Self {
            store: ParticleStore::new(config.max_particles),
            strings: Vec::new(),
            obstacles: Vec::new(),
            obstacle_cache: ObstacleCache::new(),
            accumulator,
            pool,
            rng,
            stats: StepStats::default(),
            released: false,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn properties(&self) -> &ParticleProperties {
        &self.config.properties
    }

    pub fn timestep(&self) -> f32 {
        self.config.timestep
    }

    /// Rebuild the particle store with `capacity` dead slots. Live particles
    /// are lost.
    pub fn set_maximum_particles(&mut self, capacity: usize) {
        self.config.max_particles = capacity;
        self.store.configure(capacity);
        self.released = false;
    }

    /// Replace the shared particle properties; applies from the next step
    pub fn set_properties(&mut self, mass: f32, radius: f32, bouncing: f32) -> SimulationResult<()> {
        self.config.properties = ParticleProperties::new(mass, radius, bouncing)?;
        Ok(())
    }

    pub fn set_solver(&mut self, solver: SolverKind) {
        self.config.solver = solver;
    }

    pub fn set_k_verlet(&mut self, k_verlet: f32) -> SimulationResult<()> {
        let mut candidate = self.config.clone();
        candidate.k_verlet = k_verlet;
        candidate.validate()?;
        self.config.k_verlet = k_verlet;
        Ok(())
    }

    /// Replace the obstacle list. The primitive cache is rebuilt on the next
    /// step.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
        self.obstacle_cache.invalidate();
    }

    /// Mutable access to the obstacle list. Values may change freely; call
    /// `invalidate_obstacles` if the number of obstacles of any kind changes.
    pub fn obstacles_mut(&mut self) -> &mut Vec<Obstacle> {
        &mut self.obstacles
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Force the primitive arrays to be reallocated on the next step
    pub fn invalidate_obstacles(&mut self) {
        self.obstacle_cache.invalidate();
    }

    /// Add a particle string laid out from `origin`; returns its index
    pub fn add_string(&mut self, origin: Vec3, config: StringConfig) -> usize {
        self.strings.push(ParticleString::new(origin, config, self.config.timestep));
        self.strings.len() - 1
    }

    pub fn string(&self, index: usize) -> &ParticleString {
        &self.strings[index]
    }

    pub fn string_mut(&mut self, index: usize) -> &mut ParticleString {
        &mut self.strings[index]
    }

    pub fn strings(&self) -> &[ParticleString] {
        &self.strings
    }

    /// Spawn one particle; `false` when the store is full
    pub fn spawn(&mut self, emitter: &Emitter) -> bool {
        if self.released {
            return false;
        }
        let spawned = emitter.spawn(&mut self.store, &self.config.properties, self.config.timestep, &mut self.rng);
        if spawned {
            self.stats.spawned += 1;
        } else {
            self.stats.dropped += 1;
        }
        spawned
    }

    /// Spawn up to `count` particles; returns how many were placed
    pub fn spawn_many(&mut self, emitter: &Emitter, count: usize) -> usize {
        (0..count).filter(|_| self.spawn(emitter)).count()
    }

    /// Run one fixed step: movement, obstacle refresh, collisions, strings
    pub fn step(&mut self) {
        if self.released {
            log::trace!("step on released simulation ignored");
            return;
        }

        let Self {
            config,
            store,
            strings,
            obstacles,
            obstacle_cache,
            pool,
            ..
        } = self;
        let dt = config.timestep;

        let collisions = pool.install(|| {
            integrate(store.as_mut_slice(), config.solver, config.k_verlet, dt, config.properties.mass);
            obstacle_cache.update(obstacles.as_slice());

            let mut collisions = solve_collisions(store.as_mut_slice(), obstacle_cache, &config.properties, dt);
            for string in strings.iter_mut() {
                collisions += string.step(obstacle_cache, &config.properties, config.solver, config.k_verlet, dt);
            }
            collisions
        });

        self.stats.steps += 1;
        self.stats.collisions += collisions as u64;
    }

    /// Feed one frame delta; runs as many fixed steps as have accumulated
    pub fn advance(&mut self, frame_time: f32) -> usize {
        if self.released {
            return 0;
        }
        let steps = self.accumulator.advance(frame_time, |_| {});
        for _ in 0..steps {
            self.step();
        }
        log::trace!("advance({:.4}s) ran {} steps", frame_time, steps);
        steps
    }

    /// Leftover fraction of a step, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator.alpha()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn live_count(&self) -> usize {
        self.store.live_count()
    }

    pub fn particle(&self, index: usize) -> &Particle {
        self.store.get(index)
    }

    pub fn particle_position(&self, index: usize) -> Vec3 {
        self.store.get(index).position
    }

    /// Move a particle, e.g. while dragging it; its velocity is kept
    pub fn set_particle_position(&mut self, index: usize, position: Vec3) {
        let dt = self.config.timestep;
        self.store.get_mut(index).teleport(position, dt);
    }

    /// `(position, lifetime)` per slot, for instance buffer population
    pub fn instances(&self) -> impl Iterator<Item = (Vec3, f32)> + '_ {
        self.store.instances()
    }

    pub fn stats(&self) -> StepStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = StepStats::default();
    }

    /// Free the particle, string and primitive storage. Calling it again is a
    /// no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.store.release();
        self.obstacle_cache.release();
        for string in &mut self.strings {
            string.release();
        }
        self.strings.clear();
        self.accumulator.reset();
        self.released = true;
        log::info!("Particle simulation released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl std::fmt::Debug for ParticleSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSimulation")
            .field("capacity", &self.store.capacity())
            .field("strings", &self.strings.len())
            .field("obstacles", &self.obstacles.len())
            .field("stats", &self.stats)
            .field("released", &self.released)
            .finish()
    }
}
