#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-capacity starfield simulation painted into a 1-bit bitmap.
//!
//! A [`ParticleSystem`] owns its particles, its [`Bitmap`] and a seeded
//! random number generator. Each frame the driver calls
//! [`ParticleSystem::advance`] followed by [`ParticleSystem::cull_and_respawn`]
//! and then hands [`ParticleSystem::snapshot`] to the display. Both passes
//! are O(N) and allocation free once the system has been built.

mod spawn;

use moonbound_core::{
    Axis, Bitmap, InvalidConfig, Particle, ParticleRecord, ParticleSystemConfig, Point,
    SpawnPolicy,
};

use crate::spawn::Spawner;

/// Outcome of a full simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Number of particles replaced during the cull pass.
    pub respawned: usize,
}

/// Pool of particles drifting across an exclusively owned pixel buffer.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    bitmap: Bitmap,
    particles: Vec<Particle>,
    spawner: Spawner,
}

impl ParticleSystem {
    /// Validates `config`, allocates the buffer and populates the pool.
    pub fn new(config: &ParticleSystemConfig) -> Result<Self, InvalidConfig> {
        let policy = config.validate()?;
        let mut spawner = Spawner::new(policy, config.rng_seed);

        let mut particles = Vec::with_capacity(config.capacity);
        particles.extend((0..config.capacity).map(|_| spawner.spawn()));

        log::debug!(
            "particle system ready: {} particles on a {}x{} buffer",
            particles.len(),
            config.width,
            config.height
        );

        Ok(Self {
            bitmap: Bitmap::new(config.width, config.height),
            particles,
            spawner,
        })
    }

    /// Moves every particle one step and repaints the buffer.
    ///
    /// A particle whose next step would leave the buffer only has its
    /// previous pixel erased; it is not painted at a position it is about to
    /// abandon. Within a particle the erase precedes the paint, so a
    /// stationary particle keeps its pixel. Across particles the last write
    /// to a shared cell wins.
    pub fn advance(&mut self) {
        let last_x = self.spawn_policy().last_index(Axis::X);
        let last_y = self.spawn_policy().last_index(Axis::Y);
        let bitmap = &mut self.bitmap;

        for particle in &mut self.particles {
            particle.step();

            let previous = particle.previous_position();
            let _ = bitmap.set(previous.x, previous.y, false);

            if within(particle.next_position(), last_x, last_y) {
                let current = particle.position();
                let _ = bitmap.set(current.x, current.y, true);
            }
        }
    }

    /// Replaces every particle that left the buffer and returns how many were replaced.
    ///
    /// Surviving particles keep their relative order; replacements are
    /// appended, so the pool size never changes.
    pub fn cull_and_respawn(&mut self) -> usize {
        let last_x = self.spawn_policy().last_index(Axis::X);
        let last_y = self.spawn_policy().last_index(Axis::Y);
        let before = self.particles.len();

        self.particles
            .retain(|particle| !particle.is_out_of_bounds(last_x, last_y).any());

        let culled = before - self.particles.len();
        for _ in 0..culled {
            let particle = self.spawner.respawn();
            self.particles.push(particle);
        }

        if culled > 0 {
            log::debug!("respawned {culled} of {before} particles");
        }
        culled
    }

    /// Runs [`Self::advance`] followed by [`Self::cull_and_respawn`].
    pub fn tick(&mut self) -> TickReport {
        self.advance();
        TickReport {
            respawned: self.cull_and_respawn(),
        }
    }

    /// Read-only view of the pixel buffer for the display hand-off.
    #[must_use]
    pub fn snapshot(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Particles in pool order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Fixed number of particles in the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Buffer width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    /// Buffer height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Validated parameters governing initial and replacement particles.
    #[must_use]
    pub fn spawn_policy(&self) -> &SpawnPolicy {
        self.spawner.policy()
    }

    /// Per-particle state records in pool order, for debugging.
    ///
    /// The iterator borrows the system and can be requested again at any time.
    pub fn diagnostic_dump(&self) -> impl Iterator<Item = ParticleRecord> + '_ {
        self.particles
            .iter()
            .enumerate()
            .map(|(index, particle)| ParticleRecord::new(index, particle))
    }
}

fn within(point: Point, last_x: i32, last_y: i32) -> bool {
    (0..=last_x).contains(&point.x) && (0..=last_y).contains(&point.y)
}
