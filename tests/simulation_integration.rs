// End-to-end checks of the particle session: spawning, stepping, collisions
// and teardown through the public API.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use verlet_particles::physics::collision::collide_plane;
use verlet_particles::physics::{integrate, PlanePrimitive};
use verlet_particles::{
    EmissionShape, Emitter, Obstacle, Particle, ParticleProperties, ParticleSimulation, ParticleStore,
    SimulationConfig, SolverKind,
};

const DT: f32 = 1.0 / 60.0;

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}

fn session(capacity: usize) -> ParticleSimulation {
    init_logging();
    ParticleSimulation::new(SimulationConfig {
        max_particles: capacity,
        timestep: DT,
        seed: Some(1234),
        ..SimulationConfig::default()
    })
    .unwrap()
}

fn ground(friction: f32) -> Obstacle {
    Obstacle::Plane { normal: Vec3::Y, offset: 0.0, friction }
}

#[test]
fn test_point_particle_expires_after_sixty_steps() {
    let mut sim = session(1);
    let emitter = Emitter::new(Vec3::ZERO, EmissionShape::Point)
        .with_gravity(9.8)
        .with_lifetime(1.0);
    assert!(sim.spawn(&emitter));

    for _ in 0..59 {
        sim.step();
    }
    assert!(sim.particle(0).lifetime > 0.0);
    assert!(!sim.spawn(&emitter));

    sim.step();
    assert_eq!(sim.particle(0).lifetime, 0.0);
    assert_eq!(sim.live_count(), 0);
    assert!(sim.spawn(&emitter));
}

#[test]
fn test_particle_settles_on_ground() {
    let mut sim = session(1);
    sim.set_properties(1.0, 0.05, 0.0).unwrap();
    sim.set_obstacles(vec![ground(0.0)]);

    let drop = Emitter::new(Vec3::new(0.0, 1.0, 0.0), EmissionShape::Point).with_lifetime(100.0);
    assert!(sim.spawn(&drop));

    for _ in 0..600 {
        sim.step();
        assert!(sim.particle_position(0).y >= 0.05 - 1e-4);
    }
    for _ in 0..60 {
        sim.step();
        let p = sim.particle(0);
        assert!((p.position.y - 0.05).abs() < 1e-4, "height {}", p.position.y);
        assert!(p.velocity.length() < 1e-3, "velocity {}", p.velocity);
    }
}

#[test]
fn test_free_flight_is_linear() {
    let initial = Vec3::new(1.0, 2.0, -0.5);
    let mut store = ParticleStore::new(1);
    store.set(0, Particle::new(Vec3::ZERO, initial, Vec3::ZERO, 0.5, DT));

    let mut steps = 0;
    while store.get(0).is_alive() {
        let before = store.get(0).position;
        integrate(store.as_mut_slice(), SolverKind::Verlet, 1.0, DT, 1.0);
        let displacement = store.get(0).position - before;
        assert!((displacement - initial * DT).length() < 1e-5);
        steps += 1;
        assert!(steps <= 30, "particle outlived its lifetime");
    }
    assert_eq!(steps, 30);
    assert_eq!(store.get(0).lifetime, 0.0);
}

#[test]
fn test_lifetime_never_increases() {
    let mut sim = session(128);
    sim.set_obstacles(vec![ground(0.2)]);
    let burst = Emitter::new(Vec3::new(0.0, 1.0, 0.0), EmissionShape::Explosion { speed: 3.0 }).with_lifetime(0.75);
    sim.spawn_many(&burst, 128);

    let mut previous: Vec<f32> = sim.instances().map(|(_, lifetime)| lifetime).collect();
    for _ in 0..60 {
        sim.step();
        let current: Vec<f32> = sim.instances().map(|(_, lifetime)| lifetime).collect();
        for (now, before) in current.iter().zip(&previous) {
            assert!(*now >= 0.0);
            assert!(now <= before);
        }
        previous = current;
    }
    assert_eq!(sim.live_count(), 0);
}

#[test]
fn test_dead_slots_are_untouched() {
    let mut sim = session(4);
    sim.set_obstacles(vec![ground(0.5)]);
    let short = Emitter::new(Vec3::new(0.0, 0.02, 0.0), EmissionShape::Explosion { speed: 2.0 }).with_lifetime(DT * 3.0);
    sim.spawn_many(&short, 4);

    for _ in 0..3 {
        sim.step();
    }
    assert_eq!(sim.live_count(), 0);

    let snapshot: Vec<Particle> = (0..4).map(|i| *sim.particle(i)).collect();
    for _ in 0..20 {
        sim.step();
    }
    for (i, dead) in snapshot.iter().enumerate() {
        assert_eq!(sim.particle(i), dead);
    }
}

#[test]
fn test_tilted_plane_contains_particles() {
    let mut sim = session(256);
    let normal = Vec3::new(0.3, 1.0, 0.0).normalize();
    sim.set_obstacles(vec![Obstacle::plane_through(Vec3::ZERO, normal, 0.2)]);
    let radius = sim.properties().radius;

    let burst = Emitter::new(Vec3::new(0.0, 1.0, 0.0), EmissionShape::Explosion { speed: 4.0 }).with_lifetime(3.0);
    sim.spawn_many(&burst, 256);

    for _ in 0..180 {
        sim.step();
        for (position, lifetime) in sim.instances() {
            if lifetime > 0.0 {
                assert!((position - normal * radius).dot(normal) >= -1e-4);
            }
        }
    }
    assert!(sim.stats().collisions > 0);
}

#[test]
fn test_bounce_never_adds_normal_speed() {
    let mut rng = StdRng::seed_from_u64(99);
    let plane = PlanePrimitive::new(Vec3::Y, 0.0, 0.0);

    for _ in 0..200 {
        let properties = ParticleProperties {
            mass: 1.0,
            radius: 0.0,
            bouncing: rng.gen_range(0.0..=1.0),
        };
        let friction = rng.gen_range(0.0..=1.0);
        let plane = PlanePrimitive { friction, ..plane };
        let velocity = Vec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..-0.1), rng.gen_range(-5.0..5.0));
        let mut p = Particle {
            position: Vec3::new(0.0, -0.01, 0.0),
            previous_position: Vec3::new(0.0, 0.05, 0.0),
            velocity,
            previous_velocity: velocity,
            force: Vec3::ZERO,
            lifetime: 1.0,
        };

        collide_plane(&mut p, &plane, &properties);

        assert!(p.velocity.y.abs() <= properties.bouncing * velocity.y.abs() + 1e-5);
        assert!(p.velocity.y >= 0.0);
    }
}

#[test]
fn test_continuous_emission_reuses_slots() {
    let mut sim = session(8);
    let jet = Emitter::new(Vec3::ZERO, EmissionShape::Fountain { speed: 2.0 }).with_lifetime(DT * 6.0);

    for _ in 0..600 {
        assert!(sim.spawn(&jet));
        sim.step();
    }

    let stats = sim.stats();
    assert_eq!(stats.spawned, 600);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.steps, 600);
}

#[test]
fn test_variable_frames_run_fixed_steps() {
    let mut sim = session(16);
    let frames = [1.0 / 30.0, 1.0 / 144.0, 1.0 / 50.0, 1.0 / 240.0];

    let mut total_time = 0.0f64;
    let mut total_steps = 0usize;
    for i in 0..400 {
        let frame = frames[i % frames.len()];
        total_time += frame as f64;
        total_steps += sim.advance(frame);
    }

    let expected = (total_time / DT as f64).floor() as usize;
    assert!(total_steps.abs_diff(expected) <= 1, "{} vs {}", total_steps, expected);
    assert_eq!(sim.stats().steps as usize, total_steps);
    assert!((0.0..1.0).contains(&sim.alpha()));
}

#[test]
fn test_release_twice() {
    let mut sim = session(32);
    sim.set_obstacles(vec![ground(0.0)]);
    sim.spawn_many(&Emitter::new(Vec3::ONE, EmissionShape::Explosion { speed: 1.0 }), 32);
    sim.step();

    sim.release();
    assert!(sim.is_released());
    assert_eq!(sim.capacity(), 0);
    sim.release();
    assert!(sim.is_released());

    sim.set_maximum_particles(8);
    assert!(!sim.is_released());
    assert!(sim.spawn(&Emitter::new(Vec3::ZERO, EmissionShape::Point)));
}

#[test]
fn test_config_file_drives_session() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("particles.toml");
    std::fs::write(
        &path,
        "max_particles = 12\nsolver = \"EulerSemiImplicit\"\nseed = 5\n\n[properties]\nradius = 0.1\nbouncing = 0.0\n",
    )
    .unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    let mut sim = ParticleSimulation::new(config).unwrap();
    sim.set_obstacles(vec![ground(0.0)]);
    assert_eq!(sim.capacity(), 12);

    let rain = Emitter::new(Vec3::new(0.0, 0.5, 0.0), EmissionShape::Waterfall { height: 0.5, speed: 1.0 }).with_lifetime(10.0);
    assert_eq!(sim.spawn_many(&rain, 20), 12);

    for _ in 0..240 {
        sim.step();
    }
    for (position, _) in sim.instances() {
        assert!(position.y >= 0.1 - 1e-4);
    }
}

#[test]
fn test_string_hangs_from_pin() {
    let mut sim = session(1);
    let index = sim.add_string(
        Vec3::new(0.0, 2.0, 0.0),
        verlet_particles::StringConfig {
            particle_count: 10,
            spacing: 0.1,
            direction: Vec3::X,
            elasticity: 100.0,
            damping: 0.5,
            gravity: 9.81,
        },
    );
    sim.set_properties(0.1, 0.01, 0.0).unwrap();
    sim.string_mut(index).set_pinned(0, true);

    for _ in 0..240 {
        sim.step();
    }

    let string = sim.string(index);
    assert_eq!(string.particle_position(0), Vec3::new(0.0, 2.0, 0.0));
    assert!(string.particle_position(9).y < 2.0);
}
