//! Placement and velocity draws for new particles.

use moonbound_core::{Axis, Particle, Point, SpawnPolicy, Velocity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws particles from a validated spawn policy using a seeded generator.
#[derive(Clone, Debug)]
pub(crate) struct Spawner {
    policy: SpawnPolicy,
    rng: ChaCha8Rng,
}

impl Spawner {
    pub(crate) fn new(policy: SpawnPolicy, seed: u64) -> Self {
        Self {
            policy,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    /// Particle placed by the start/randomize rules, used to populate the pool.
    pub(crate) fn spawn(&mut self) -> Particle {
        let position = Point::new(self.placement(Axis::X), self.placement(Axis::Y));
        Particle::new(position, self.velocity())
    }

    /// Replacement for a culled particle, entering opposite the drift.
    pub(crate) fn respawn(&mut self) -> Particle {
        let x_edge = self.policy.entry_edge(Axis::X);
        let y_edge = self.policy.entry_edge(Axis::Y);

        let position = match (x_edge, y_edge) {
            (Some(x), None) => Point::new(x, self.anywhere(Axis::Y)),
            (None, Some(y)) => Point::new(self.anywhere(Axis::X), y),
            (Some(x), Some(y)) => {
                if self.rng.gen_bool(0.5) {
                    Point::new(x, self.anywhere(Axis::Y))
                } else {
                    Point::new(self.anywhere(Axis::X), y)
                }
            }
            (None, None) => return self.spawn(),
        };

        Particle::new(position, self.velocity())
    }

    fn placement(&mut self, axis: Axis) -> i32 {
        if self.policy.randomizes(axis) {
            return self.anywhere(axis);
        }
        match axis {
            Axis::X => self.policy.start().x,
            Axis::Y => self.policy.start().y,
        }
    }

    fn anywhere(&mut self, axis: Axis) -> i32 {
        self.rng.gen_range(0..=self.policy.last_index(axis))
    }

    fn velocity(&mut self) -> Velocity {
        Velocity::new(self.component(Axis::X), self.component(Axis::Y))
    }

    fn component(&mut self, axis: Axis) -> i32 {
        let range = self.policy.velocity_range(axis);
        // 0..0 pins the axis; validation guarantees every other range is non-empty.
        if range.is_locked() {
            return 0;
        }
        self.rng.gen_range(range.min()..range.max())
    }
}
