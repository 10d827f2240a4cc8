#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame loop and display contracts for Moonbound adapters.
//!
//! The [`FrameDriver`] runs one tick at a time: it polls the timer signal,
//! advances and culls the starfield, steps the rocket, and finally presents a
//! read-only [`Frame`] to a [`Display`] implementation. Displays never receive
//! mutable access to simulation state.

use anyhow::{Context, Result as AnyResult};
use moonbound_core::{Bitmap, InvalidConfig, ParticleSystemConfig, TimerSignal, HEADER_TEXT};
use moonbound_system_cycle_counter::CycleCounter;
use moonbound_system_particles::ParticleSystem;
use moonbound_system_shuttle::{RocketShuttle, ShuttleConfig, ShuttleError, ShuttleStep};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete scene configuration loaded by adapters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Starfield parameters.
    pub particles: ParticleSystemConfig,
    /// Rocket path parameters.
    pub shuttle: ShuttleConfig,
}

/// Errors raised while assembling a scene.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// The starfield configuration was rejected.
    #[error("invalid particle configuration: {0}")]
    Particles(#[from] InvalidConfig),
    /// The rocket path configuration was rejected.
    #[error("invalid shuttle configuration: {0}")]
    Shuttle(#[from] ShuttleError),
}

/// Pose of the rocket sprite for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RocketPose {
    /// Position along the shuttle path in pixels.
    pub position: i32,
    /// Whether the sprite is mirrored.
    pub flipped: bool,
}

/// Read-only view of everything a display needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Sequence number of the frame, starting at one.
    pub number: u64,
    /// Starfield mask.
    pub pixels: &'a Bitmap,
    /// Static header text.
    pub header: &'a str,
    /// Cycle counter label.
    pub counter_label: &'a str,
    /// Rocket sprite pose.
    pub rocket: RocketPose,
}

/// Collaborator that flushes frames to a physical or virtual screen.
pub trait Display {
    /// Copies the frame to the output. The frame must be treated as read-only.
    fn present(&mut self, frame: &Frame<'_>) -> AnyResult<()>;
}

/// Summary of a completed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Sequence number of the presented frame.
    pub number: u64,
    /// Particles replaced during the cull pass.
    pub respawned: usize,
    /// Whether the timer fired and the label changed.
    pub counter_changed: bool,
    /// Rocket movement performed this tick.
    pub rocket: ShuttleStep,
}

/// Single-threaded frame loop wiring the scene systems to a display.
#[derive(Debug)]
pub struct FrameDriver<D, T> {
    particles: ParticleSystem,
    shuttle: RocketShuttle,
    counter: CycleCounter,
    label: String,
    timer: T,
    display: D,
    frames: u64,
}

impl<D, T> FrameDriver<D, T>
where
    D: Display,
    T: TimerSignal,
{
    /// Builds every scene system from `config`.
    pub fn new(config: &SceneConfig, timer: T, display: D) -> Result<Self, SceneError> {
        let particles = ParticleSystem::new(&config.particles)?;
        let shuttle = RocketShuttle::new(config.shuttle)?;
        let counter = CycleCounter::default();
        log::debug!(
            "scene assembled: {} particles, rocket at {}",
            particles.capacity(),
            shuttle.position()
        );

        Ok(Self {
            particles,
            shuttle,
            label: counter.label(),
            counter,
            timer,
            display,
            frames: 0,
        })
    }

    /// Runs one full tick and presents the resulting frame.
    ///
    /// The timer is polled exactly once, before the simulation runs, so the
    /// label never changes part way through a tick.
    pub fn tick(&mut self) -> AnyResult<FrameReport> {
        let counter_changed = self.counter.poll(&mut self.timer);
        if counter_changed {
            self.label = self.counter.label();
        }

        self.particles.advance();
        let respawned = self.particles.cull_and_respawn();
        let rocket = self.shuttle.step();

        self.frames += 1;
        let frame = Frame {
            number: self.frames,
            pixels: self.particles.snapshot(),
            header: HEADER_TEXT,
            counter_label: &self.label,
            rocket: RocketPose {
                position: self.shuttle.position(),
                flipped: self.shuttle.flipped(),
            },
        };
        self.display
            .present(&frame)
            .with_context(|| format!("failed to present frame {}", self.frames))?;

        Ok(FrameReport {
            number: self.frames,
            respawned,
            counter_changed,
            rocket,
        })
    }

    /// Starfield owned by the driver.
    #[must_use]
    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Cycle counter owned by the driver.
    #[must_use]
    pub fn counter(&self) -> &CycleCounter {
        &self.counter
    }

    /// Display the driver presents to.
    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    #[derive(Default)]
    struct RecordingDisplay {
        lit: Vec<usize>,
        labels: Vec<String>,
        rockets: Vec<RocketPose>,
        fail_on: Option<u64>,
    }

    impl Display for RecordingDisplay {
        fn present(&mut self, frame: &Frame<'_>) -> AnyResult<()> {
            if self.fail_on == Some(frame.number) {
                bail!("panel disconnected");
            }
            self.lit.push(frame.pixels.count_lit());
            self.labels.push(frame.counter_label.to_owned());
            self.rockets.push(frame.rocket);
            assert_eq!(frame.header, HEADER_TEXT);
            Ok(())
        }
    }

    /// Fires on a fixed schedule of tick numbers.
    struct ScriptedTimer {
        polls: u64,
        fire_on: Vec<u64>,
    }

    impl ScriptedTimer {
        fn new(fire_on: Vec<u64>) -> Self {
            Self { polls: 0, fire_on }
        }
    }

    impl TimerSignal for ScriptedTimer {
        fn fired(&self) -> bool {
            self.fire_on.contains(&(self.polls + 1))
        }

        fn clear(&mut self) {
            self.fire_on.retain(|&tick| tick != self.polls + 1);
        }
    }

    fn driver(fire_on: Vec<u64>) -> FrameDriver<RecordingDisplay, ScriptedTimer> {
        FrameDriver::new(
            &SceneConfig::default(),
            ScriptedTimer::new(fire_on),
            RecordingDisplay::default(),
        )
        .expect("default scene is valid")
    }

    fn run(driver: &mut FrameDriver<RecordingDisplay, ScriptedTimer>, ticks: u64) {
        for _ in 0..ticks {
            let _ = driver.tick().expect("recording display never fails");
            driver.timer.polls += 1;
        }
    }

    #[test]
    fn presents_one_frame_per_tick() {
        let mut driver = driver(Vec::new());
        run(&mut driver, 10);

        assert_eq!(driver.frames(), 10);
        assert_eq!(driver.display().lit.len(), 10);
        assert_eq!(driver.particles().particles().len(), 50);
        assert!(driver.display().lit.iter().all(|&lit| lit <= 50));
    }

    #[test]
    fn label_updates_once_per_firing() {
        let mut driver = driver(vec![2, 5]);
        run(&mut driver, 6);

        let labels = &driver.display().labels;
        assert_eq!(labels[0], "1 times!");
        assert_eq!(labels[1], "2 times!");
        assert_eq!(labels[3], "2 times!");
        assert_eq!(labels[4], "3 times!");
        assert_eq!(driver.counter().cycles(), 3);
    }

    #[test]
    fn rocket_pose_follows_shuttle() {
        let mut driver = driver(Vec::new());
        run(&mut driver, 3);

        let positions: Vec<_> = driver
            .display()
            .rockets
            .iter()
            .map(|pose| pose.position)
            .collect();
        assert_eq!(positions, vec![192, 192, 128]);
        assert!(!driver.display().rockets[2].flipped);
    }

    #[test]
    fn display_failure_is_reported_with_frame_number() {
        let mut driver = FrameDriver::new(
            &SceneConfig::default(),
            ScriptedTimer::new(Vec::new()),
            RecordingDisplay {
                fail_on: Some(2),
                ..RecordingDisplay::default()
            },
        )
        .expect("default scene is valid");

        assert!(driver.tick().is_ok());
        let error = driver.tick().expect_err("second frame must fail");
        assert_eq!(error.to_string(), "failed to present frame 2");
        assert_eq!(error.root_cause().to_string(), "panel disconnected");
    }

    #[test]
    fn invalid_scene_is_rejected() {
        let config = SceneConfig {
            particles: ParticleSystemConfig {
                capacity: 0,
                ..ParticleSystemConfig::default()
            },
            ..SceneConfig::default()
        };

        let error = FrameDriver::new(
            &config,
            ScriptedTimer::new(Vec::new()),
            RecordingDisplay::default(),
        )
        .err()
        .expect("zero capacity must be rejected");
        assert_eq!(error, SceneError::Particles(InvalidConfig::ZeroCapacity));
    }
}
