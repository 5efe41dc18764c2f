use glam::Vec3;

use crate::particles::Particle;

/// Fixed-capacity particle arena.
///
/// Slots are never compacted or relocated: a slot index identifies the same
/// particle from spawn until it dies. Dead slots (`lifetime <= 0`) are found
/// again by a ring scan starting at `next_free`.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Where the next free-slot scan starts
    next_free: usize,
    released: bool,
}

impl ParticleStore {
    /// Create a store with `capacity` dead slots
    pub fn new(capacity: usize) -> Self {
        let mut store = Self::default();
        store.configure(capacity);
        store
    }

    /// Reallocate storage for exactly `capacity` dead slots.
    ///
    /// Every live particle is dropped and every previously handed out index
    /// becomes meaningless.
    pub fn configure(&mut self, capacity: usize) {
        self.particles = vec![Particle::default(); capacity];
        self.next_free = 0;
        self.released = false;
        log::debug!("[ParticleStore] configured {} slots", capacity);
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn get(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    pub fn set(&mut self, index: usize, particle: Particle) {
        self.particles[index] = particle;
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Find the first dead slot at or after the cursor, wrapping around the
    /// end of the array. Each slot is visited at most once.
    pub fn find_free_slot(&mut self) -> Option<usize> {
        let capacity = self.particles.len();
        if capacity == 0 {
            return None;
        }

        let start = self.next_free % capacity;
        for offset in 0..capacity {
            let index = (start + offset) % capacity;
            if !self.particles[index].is_alive() {
                self.next_free = (index + 1) % capacity;
                return Some(index);
            }
        }
        None
    }

    /// Number of live particles
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// `(position, lifetime)` for every slot, dead ones included, in slot order
    pub fn instances(&self) -> impl Iterator<Item = (Vec3, f32)> + '_ {
        self.particles.iter().map(|p| (p.position, p.lifetime))
    }

    /// Free all storage. Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.particles = Vec::new();
        self.next_free = 0;
        self.released = true;
        log::debug!("[ParticleStore] released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}
