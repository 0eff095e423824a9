//! Fixed-speed approach to a target range window.
//!
//! Direction follows the averaged reading: below the window reverses,
//! above it drives forward, inside it holds. The primitive finishes once
//! both sensors are individually within tolerance, or after the wall-clock
//! backstop.

use std::time::Duration;

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use rover_common::robot::config::PositioningConfig;
use tracing::{info, warn};

use crate::command::lifecycle::Command;
use crate::control::mixing::WheelSpeeds;
use crate::error::CommandError;
use crate::safety::latch::WarnLatch;
use crate::safety::timeout::DeadlineTimeout;
use crate::subsystem::drivetrain::Drivetrain;
use crate::subsystem::range::RangeSensors;

const NAME: &str = "DriveToTargetDistance";

#[derive(Debug, Clone)]
pub struct DriveToTargetDistance {
    drivetrain: Drivetrain,
    sensors: RangeSensors,
    target_m: f64,
    tolerance_m: f64,
    speed: f64,
    deadline: DeadlineTimeout,
    invalid: WarnLatch,
}

impl DriveToTargetDistance {
    /// # Errors
    /// `InvalidParameter` for non-finite or negative target, tolerance or
    /// speed.
    pub fn new(drivetrain: Drivetrain, config: &PositioningConfig) -> Result<Self, CommandError> {
        let target_m =
            CommandError::check_non_negative(NAME, "target_distance_m", config.target_distance_m)?;
        let tolerance_m = CommandError::check_non_negative(NAME, "tolerance_m", config.tolerance_m)?;
        let speed = CommandError::check_non_negative(NAME, "speed", config.speed)?;
        let timeout_s = CommandError::check_non_negative(NAME, "timeout_s", config.timeout_s)?;
        let timeout = Duration::try_from_secs_f64(timeout_s).map_err(|_| {
            CommandError::InvalidParameter {
                command: NAME,
                parameter: "timeout_s",
                value: timeout_s,
            }
        })?;
        Ok(Self {
            drivetrain,
            sensors: RangeSensors,
            target_m,
            tolerance_m,
            speed,
            deadline: DeadlineTimeout::new(timeout),
            invalid: WarnLatch::new(),
        })
    }
}

impl Command for DriveToTargetDistance {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.deadline.start(hw.elapsed());
        self.invalid.clear();
        info!(target_m = self.target_m, "positioning started");
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let pair = self.sensors.read(hw);
        if pair.both_valid() {
            self.invalid.clear();
        } else if self.invalid.raise() {
            warn!(
                left = pair.left.raw(),
                right = pair.right.raw(),
                "range sensors invalid, holding drivetrain"
            );
        }

        if pair.both_within(self.target_m, self.tolerance_m) {
            self.drivetrain.stop(hw)?;
            return Ok(());
        }
        let Some(average) = pair.average() else {
            self.drivetrain.stop(hw)?;
            return Ok(());
        };

        let speed = if average < self.target_m - self.tolerance_m {
            -self.speed
        } else if average > self.target_m + self.tolerance_m {
            self.speed
        } else {
            0.0
        };
        self.drivetrain
            .set_motors(hw, WheelSpeeds::new(speed, speed))?;
        Ok(())
    }

    fn is_finished(&mut self, hw: &dyn Hardware) -> Result<bool, CommandError> {
        if self.deadline.expired(hw.elapsed()) {
            warn!(
                timeout_s = self.deadline.duration().as_secs_f64(),
                "{NAME} timed out"
            );
            return Ok(true);
        }
        Ok(self
            .sensors
            .read(hw)
            .both_within(self.target_m, self.tolerance_m))
    }

    fn end(&mut self, hw: &mut dyn Hardware, interrupted: bool) -> Result<(), CommandError> {
        self.drivetrain.stop(hw)?;
        info!(interrupted, "positioning ended");
        Ok(())
    }
}
