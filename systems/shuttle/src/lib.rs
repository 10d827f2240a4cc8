#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ping-pong motion for the rocket sprite shuttling between the planets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Edge length of a sprite tile on the reference panel.
pub const TILE_LENGTH: i32 = 16;

/// Parameters of the shuttle path along one axis, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuttleConfig {
    /// Position occupied before the first step.
    pub start: i32,
    /// Lowest reachable position.
    pub min: i32,
    /// Highest reachable position.
    pub max: i32,
    /// Distance covered by a single step.
    pub stride: i32,
    /// Whether the rocket initially travels towards `max`.
    pub forward: bool,
}

impl Default for ShuttleConfig {
    fn default() -> Self {
        Self {
            start: 8 * TILE_LENGTH,
            min: 0,
            max: 12 * TILE_LENGTH,
            stride: 4 * TILE_LENGTH,
            forward: true,
        }
    }
}

/// Reasons a shuttle configuration is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ShuttleError {
    /// The stride must move the rocket.
    #[error("shuttle stride must be positive (received {stride})")]
    NonPositiveStride {
        /// Requested stride.
        stride: i32,
    },
    /// The start must lie on the path.
    #[error("shuttle start {start} lies outside {min}..={max}")]
    StartOffPath {
        /// Requested start.
        start: i32,
        /// Requested lower end.
        min: i32,
        /// Requested upper end.
        max: i32,
    },
}

/// Direction of travel along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Travelling towards the upper end.
    Forward,
    /// Travelling towards the lower end.
    Backward,
}

/// Result of a single shuttle step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShuttleStep {
    /// The rocket moved to the contained position.
    Moved(i32),
    /// The rocket reached an end and turned to the contained heading.
    Turned(Heading),
}

/// Rocket bouncing between two ends of a straight path.
#[derive(Clone, Debug)]
pub struct RocketShuttle {
    min: i32,
    max: i32,
    stride: i32,
    position: i32,
    heading: Heading,
}

impl RocketShuttle {
    /// Creates a shuttle from a validated configuration.
    pub fn new(config: ShuttleConfig) -> Result<Self, ShuttleError> {
        if config.stride <= 0 {
            return Err(ShuttleError::NonPositiveStride {
                stride: config.stride,
            });
        }
        if config.start < config.min || config.start > config.max {
            return Err(ShuttleError::StartOffPath {
                start: config.start,
                min: config.min,
                max: config.max,
            });
        }

        Ok(Self {
            min: config.min,
            max: config.max,
            stride: config.stride,
            position: config.start,
            heading: if config.forward {
                Heading::Forward
            } else {
                Heading::Backward
            },
        })
    }

    /// Current position along the path.
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Current direction of travel.
    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// Whether the sprite should be drawn mirrored, i.e. facing forward.
    #[must_use]
    pub const fn flipped(&self) -> bool {
        matches!(self.heading, Heading::Forward)
    }

    /// Advances by one stride, or turns around when an end has been reached.
    ///
    /// Turning consumes a whole step so the rocket pauses at each end.
    pub fn step(&mut self) -> ShuttleStep {
        match self.heading {
            Heading::Forward if self.position < self.max => {
                self.position = (self.position + self.stride).min(self.max);
                ShuttleStep::Moved(self.position)
            }
            Heading::Backward if self.position > self.min => {
                self.position = (self.position - self.stride).max(self.min);
                ShuttleStep::Moved(self.position)
            }
            Heading::Forward => {
                self.heading = Heading::Backward;
                ShuttleStep::Turned(self.heading)
            }
            Heading::Backward => {
                self.heading = Heading::Forward;
                ShuttleStep::Turned(self.heading)
            }
        }
    }
}
