#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Moonbound display engine.
//!
//! This crate defines the vocabulary that connects the particle simulation,
//! the scene systems and the display adapters. A [`Particle`] carries its own
//! kinematic state, a [`Bitmap`] stores the 1-bit starfield mask, and a
//! [`ParticleSystemConfig`] is validated into an immutable [`SpawnPolicy`]
//! before any simulation state is allocated. Nothing in here holds
//! process-wide state; adapters own every value they create.

mod bitmap;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bitmap::{Bitmap, LitCells};

/// Header line shown above the cycle counter.
pub const HEADER_TEXT: &str = "I love you to the moon and back";

/// Screen width of the reference TFT panel in pixels.
pub const SCREEN_WIDTH: u32 = 480;

/// Screen height of the reference TFT panel in pixels.
pub const SCREEN_HEIGHT: u32 = 320;

/// Location expressed in pixel-buffer coordinates.
///
/// Coordinates are signed because particles routinely step past the buffer
/// edges before they are culled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column index, growing to the right.
    pub x: i32,
    /// Row index, growing downwards.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the point displaced by the provided velocity.
    #[must_use]
    pub const fn offset(self, velocity: Velocity) -> Self {
        Self {
            x: self.x.wrapping_add(velocity.dx),
            y: self.y.wrapping_add(velocity.dy),
        }
    }
}

/// Signed per-tick displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal displacement in pixels per tick.
    pub dx: i32,
    /// Vertical displacement in pixels per tick.
    pub dy: i32,
}

impl Velocity {
    /// Creates a new velocity.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Per-axis result of an out-of-bounds test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutOfBounds {
    /// Whether the horizontal coordinate left `[0, bound_x]`.
    pub x: bool,
    /// Whether the vertical coordinate left `[0, bound_y]`.
    pub y: bool,
}

impl OutOfBounds {
    /// Returns `true` when either axis is out of bounds.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.x || self.y
    }
}

/// A single monochrome point moving at a constant velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Particle {
    position: Point,
    previous: Point,
    velocity: Velocity,
}

impl Particle {
    /// Creates a particle at `position`; its previous position starts at the origin.
    #[must_use]
    pub const fn new(position: Point, velocity: Velocity) -> Self {
        Self {
            position,
            previous: Point::new(0, 0),
            velocity,
        }
    }

    /// Location after the most recent step.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Location before the most recent step.
    #[must_use]
    pub const fn previous_position(&self) -> Point {
        self.previous
    }

    /// Displacement applied on every step.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Location the particle will occupy after its next step.
    #[must_use]
    pub const fn next_position(&self) -> Point {
        self.position.offset(self.velocity)
    }

    /// Records the current position as previous and applies the velocity.
    ///
    /// Bounds are not checked here; the owning system decides what leaving
    /// the buffer means.
    pub fn step(&mut self) {
        self.previous = self.position;
        self.position = self.position.offset(self.velocity);
    }

    /// Tests the current position against the inclusive ranges
    /// `[0, bound_x]` and `[0, bound_y]`.
    #[must_use]
    pub const fn is_out_of_bounds(&self, bound_x: i32, bound_y: i32) -> OutOfBounds {
        OutOfBounds {
            x: self.position.x < 0 || self.position.x > bound_x,
            y: self.position.y < 0 || self.position.y > bound_y,
        }
    }
}

/// Debug record describing one particle of a system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleRecord {
    /// Position of the particle within the pool.
    pub index: usize,
    /// Current column.
    pub x: i32,
    /// Current row.
    pub y: i32,
    /// Previous column.
    pub px: i32,
    /// Previous row.
    pub py: i32,
    /// Horizontal velocity.
    pub dx: i32,
    /// Vertical velocity.
    pub dy: i32,
}

impl ParticleRecord {
    /// Builds the record for `particle` stored at `index`.
    #[must_use]
    pub const fn new(index: usize, particle: &Particle) -> Self {
        let position = particle.position();
        let previous = particle.previous_position();
        let velocity = particle.velocity();
        Self {
            index,
            x: position.x,
            y: position.y,
            px: previous.x,
            py: previous.y,
            dx: velocity.dx,
            dy: velocity.dy,
        }
    }
}

impl fmt::Display for ParticleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "particle {:>4} x {:>5} y {:>5} px {:>5} py {:>5} dx {:>4} dy {:>4}",
            self.index, self.x, self.y, self.px, self.py, self.dx, self.dy
        )
    }
}

/// Axis of the pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Raw particle system parameters as supplied by an adapter.
///
/// Nothing here is trusted until [`ParticleSystemConfig::validate`] has
/// produced a [`SpawnPolicy`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// Number of particles kept alive at all times.
    pub capacity: usize,
    /// Buffer height in pixels.
    pub height: u32,
    /// Buffer width in pixels.
    pub width: u32,
    /// Inclusive lower bound of the horizontal velocity draw.
    pub min_dx: i32,
    /// Exclusive upper bound of the horizontal velocity draw.
    pub max_dx: i32,
    /// Inclusive lower bound of the vertical velocity draw.
    pub min_dy: i32,
    /// Exclusive upper bound of the vertical velocity draw.
    pub max_dy: i32,
    /// Column used when `randomize_x` is off.
    pub start_x: i32,
    /// Row used when `randomize_y` is off.
    pub start_y: i32,
    /// Draw the spawn column uniformly across the buffer.
    pub randomize_x: bool,
    /// Draw the spawn row uniformly across the buffer.
    pub randomize_y: bool,
    /// Seed for the simulation's random number generator.
    pub rng_seed: u64,
}

impl Default for ParticleSystemConfig {
    /// Leftward starfield covering the reference panel.
    fn default() -> Self {
        Self {
            capacity: 50,
            height: SCREEN_HEIGHT,
            width: SCREEN_WIDTH,
            min_dx: -35,
            max_dx: 0,
            min_dy: 0,
            max_dy: 0,
            start_x: SCREEN_WIDTH as i32 - 1,
            start_y: 0,
            randomize_x: false,
            randomize_y: true,
            rng_seed: 0x6d6f_6f6e,
        }
    }
}

impl ParticleSystemConfig {
    /// Checks every parameter and produces the immutable spawn policy.
    pub fn validate(&self) -> Result<SpawnPolicy, InvalidConfig> {
        if self.capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }
        if self.width == 0 || self.height == 0 {
            return Err(InvalidConfig::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        let width = checked_dimension(Axis::X, self.width)?;
        let height = checked_dimension(Axis::Y, self.height)?;

        let velocity_x = VelocityRange::new(Axis::X, self.min_dx, self.max_dx)?;
        let velocity_y = VelocityRange::new(Axis::Y, self.min_dy, self.max_dy)?;

        Ok(SpawnPolicy {
            width,
            height,
            velocity_x,
            velocity_y,
            start: Point::new(self.start_x, self.start_y),
            randomize_x: self.randomize_x,
            randomize_y: self.randomize_y,
        })
    }
}

fn checked_dimension(axis: Axis, value: u32) -> Result<i32, InvalidConfig> {
    i32::try_from(value).map_err(|_| InvalidConfig::DimensionTooLarge { axis, value })
}

/// Half-open range `[min, max)` a velocity component is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VelocityRange {
    min: i32,
    max: i32,
}

impl VelocityRange {
    fn new(axis: Axis, min: i32, max: i32) -> Result<Self, InvalidConfig> {
        if min > max {
            return Err(InvalidConfig::InvertedVelocityRange { axis, min, max });
        }
        if min == max && min != 0 {
            return Err(InvalidConfig::EmptyVelocityRange { axis, value: min });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(&self) -> i32 {
        self.min
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Returns `true` when both bounds are zero, which pins the component at zero.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Direction every draw from this range travels in, if it has one.
    #[must_use]
    pub const fn drift(&self) -> Drift {
        if self.is_locked() {
            Drift::None
        } else if self.max <= 0 {
            Drift::Negative
        } else if self.min >= 0 {
            Drift::Positive
        } else {
            Drift::None
        }
    }
}

/// Sign shared by every velocity drawn from a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Drift {
    /// Draws may be zero or have mixed signs.
    None,
    /// Every draw is negative; particles leave through the low edge.
    Negative,
    /// Every draw is non-negative; particles leave through the high edge.
    Positive,
}

/// Validated, immutable spawn parameters of a particle system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnPolicy {
    width: i32,
    height: i32,
    velocity_x: VelocityRange,
    velocity_y: VelocityRange,
    start: Point,
    randomize_x: bool,
    randomize_y: bool,
}

impl SpawnPolicy {
    /// Buffer width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Buffer height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Velocity range along the requested axis.
    #[must_use]
    pub const fn velocity_range(&self, axis: Axis) -> VelocityRange {
        match axis {
            Axis::X => self.velocity_x,
            Axis::Y => self.velocity_y,
        }
    }

    /// Fixed start coordinates used on non-randomized axes.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Whether spawn coordinates on `axis` are drawn across the buffer.
    #[must_use]
    pub const fn randomizes(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.randomize_x,
            Axis::Y => self.randomize_y,
        }
    }

    /// Last valid index along `axis`.
    #[must_use]
    pub const fn last_index(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.width - 1,
            Axis::Y => self.height - 1,
        }
    }

    /// Coordinate replacements enter at along `axis`, opposite the drift.
    #[must_use]
    pub const fn entry_edge(&self, axis: Axis) -> Option<i32> {
        match self.velocity_range(axis).drift() {
            Drift::None => None,
            Drift::Negative => Some(self.last_index(axis)),
            Drift::Positive => Some(0),
        }
    }
}

/// Reasons a particle system configuration is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InvalidConfig {
    /// The pool must hold at least one particle.
    #[error("particle capacity must be positive")]
    ZeroCapacity,
    /// Both buffer dimensions must be positive.
    #[error("buffer dimensions must be positive (received {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A dimension does not fit the signed coordinate space.
    #[error("{axis} dimension {value} exceeds the coordinate range")]
    DimensionTooLarge {
        /// Offending axis.
        axis: Axis,
        /// Requested dimension.
        value: u32,
    },
    /// The lower velocity bound exceeds the upper one.
    #[error("{axis} velocity range is inverted (min {min} > max {max})")]
    InvertedVelocityRange {
        /// Offending axis.
        axis: Axis,
        /// Requested lower bound.
        min: i32,
        /// Requested upper bound.
        max: i32,
    },
    /// Equal non-zero bounds leave nothing to draw from.
    #[error("{axis} velocity range [{value}, {value}) is empty; only 0..0 locks an axis")]
    EmptyVelocityRange {
        /// Offending axis.
        axis: Axis,
        /// Shared bound value.
        value: i32,
    },
}

/// Asynchronous "timer fired" flag polled by the frame loop.
///
/// Implementations are set from outside the frame loop (an interrupt line, a
/// background thread) and cleared by whoever consumes the event.
pub trait TimerSignal {
    /// Reports whether the timer fired since the flag was last cleared.
    fn fired(&self) -> bool;

    /// Acknowledges the event so it is not counted twice.
    fn clear(&mut self);

    /// Reports and clears the flag in one step.
    ///
    /// Implementations backed by shared state should override this with an
    /// atomic swap; the default leaves a window between the read and the
    /// clear in which a firing is lost.
    fn take(&mut self) -> bool {
        let fired = self.fired();
        if fired {
            self.clear();
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_records_previous_position() {
        let mut particle = Particle::new(Point::new(5, 3), Velocity::new(-2, 1));
        assert_eq!(particle.previous_position(), Point::new(0, 0));

        particle.step();

        assert_eq!(particle.previous_position(), Point::new(5, 3));
        assert_eq!(particle.position(), Point::new(3, 4));
        assert_eq!(particle.next_position(), Point::new(1, 5));
    }

    #[test]
    fn out_of_bounds_is_inclusive() {
        let inside = Particle::new(Point::new(9, 4), Velocity::default());
        assert!(!inside.is_out_of_bounds(9, 4).any());

        let right = Particle::new(Point::new(10, 0), Velocity::default());
        assert_eq!(right.is_out_of_bounds(9, 4), OutOfBounds { x: true, y: false });

        let above = Particle::new(Point::new(0, -1), Velocity::default());
        assert_eq!(above.is_out_of_bounds(9, 4), OutOfBounds { x: false, y: true });
    }

    #[test]
    fn default_config_validates() {
        let policy = ParticleSystemConfig::default()
            .validate()
            .expect("device defaults must be valid");

        assert_eq!(policy.width(), 480);
        assert_eq!(policy.entry_edge(Axis::X), Some(479));
        assert_eq!(policy.entry_edge(Axis::Y), None);
        assert!(policy.velocity_range(Axis::Y).is_locked());
    }

    #[test]
    fn rejects_invalid_configs() {
        let base = ParticleSystemConfig::default();

        let zero_capacity = ParticleSystemConfig {
            capacity: 0,
            ..base.clone()
        };
        assert_eq!(zero_capacity.validate(), Err(InvalidConfig::ZeroCapacity));

        let zero_height = ParticleSystemConfig {
            height: 0,
            ..base.clone()
        };
        assert!(matches!(
            zero_height.validate(),
            Err(InvalidConfig::ZeroDimension { height: 0, .. })
        ));

        let inverted = ParticleSystemConfig {
            min_dy: 3,
            max_dy: 1,
            ..base.clone()
        };
        assert_eq!(
            inverted.validate(),
            Err(InvalidConfig::InvertedVelocityRange {
                axis: Axis::Y,
                min: 3,
                max: 1
            })
        );

        let empty = ParticleSystemConfig {
            min_dx: -2,
            max_dx: -2,
            ..base
        };
        assert!(matches!(
            empty.validate(),
            Err(InvalidConfig::EmptyVelocityRange { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn off_screen_start_is_accepted() {
        let config = ParticleSystemConfig {
            start_x: 480,
            start_y: -3,
            randomize_y: false,
            ..ParticleSystemConfig::default()
        };

        let policy = config.validate().expect("off-screen starts are allowed");
        assert_eq!(policy.start(), Point::new(480, -3));
    }

    #[test]
    fn randomized_axis_ignores_start() {
        let config = ParticleSystemConfig {
            start_y: -40,
            randomize_y: true,
            ..ParticleSystemConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn drift_follows_range_sign() {
        let policy = ParticleSystemConfig {
            min_dx: -1,
            max_dx: 2,
            min_dy: 1,
            max_dy: 3,
            ..ParticleSystemConfig::default()
        }
        .validate()
        .expect("valid config");

        assert_eq!(policy.velocity_range(Axis::X).drift(), Drift::None);
        assert_eq!(policy.entry_edge(Axis::X), None);
        assert_eq!(policy.velocity_range(Axis::Y).drift(), Drift::Positive);
        assert_eq!(policy.entry_edge(Axis::Y), Some(0));
    }

    #[test]
    fn config_reads_partial_toml() {
        let config: ParticleSystemConfig = toml::from_str(
            r#"
            capacity = 3
            width = 10
            height = 5
            min_dx = -2
            max_dx = -1
            "#,
        )
        .expect("partial config should deserialize");

        assert_eq!(config.capacity, 3);
        assert_eq!(config.width, 10);
        assert_eq!(config.min_dy, 0);
        assert!(config.randomize_y);
    }

    #[test]
    fn record_display_lists_every_field() {
        let mut particle = Particle::new(Point::new(4, 2), Velocity::new(-1, 0));
        particle.step();
        let line = ParticleRecord::new(7, &particle).to_string();

        assert!(line.starts_with("particle    7"));
        assert!(line.contains("px     4"));
        assert!(line.contains("dx   -1"));
    }
}
