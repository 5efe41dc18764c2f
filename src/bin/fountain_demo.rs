//! Headless fountain over a ground plane, driven by uneven frame deltas.
//!
//! Usage: fountain_demo [config.toml]

use anyhow::{Context, Result};
use glam::Vec3;
use verlet_particles::{EmissionShape, Emitter, Obstacle, ParticleSimulation, SimulationConfig};

const FRAMES: usize = 600;
const SPAWNS_PER_FRAME: usize = 8;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SimulationConfig {
            max_particles: 2048,
            seed: Some(1),
            ..SimulationConfig::default()
        },
    };

    let mut sim = ParticleSimulation::new(config)?;
    sim.set_obstacles(vec![
        Obstacle::Plane { normal: Vec3::Y, offset: 0.0, friction: 0.1 },
        Obstacle::plane_through(Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_X, 0.0),
        Obstacle::plane_through(Vec3::new(-2.0, 0.0, 0.0), Vec3::X, 0.0),
    ]);

    let fountain = Emitter::new(Vec3::new(0.0, 0.1, 0.0), EmissionShape::Fountain { speed: 5.0 })
        .with_lifetime(4.0);

    // 50, 60 and 144 Hz frames in turn
    let frame_times = [1.0 / 50.0, 1.0 / 60.0, 1.0 / 144.0];

    for frame in 0..FRAMES {
        sim.spawn_many(&fountain, SPAWNS_PER_FRAME);
        sim.advance(frame_times[frame % frame_times.len()]);

        if frame % 60 == 0 {
            let lowest = sim
                .instances()
                .filter(|(_, lifetime)| *lifetime > 0.0)
                .map(|(position, _)| position.y)
                .fold(f32::INFINITY, f32::min);
            log::info!(
                "[Fountain] frame {:>4}: {:>5} live, lowest y = {:.4}",
                frame,
                sim.live_count(),
                lowest
            );
        }
    }

    let stats = sim.stats();
    log::info!(
        "[Fountain] done: {} steps, {} spawned, {} dropped, {} collisions",
        stats.steps,
        stats.spawned,
        stats.dropped,
        stats.collisions
    );

    sim.release();
    Ok(())
}
