//! Distance-bounded straight drive.

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use tracing::warn;

use crate::command::lifecycle::Command;
use crate::control::mixing::WheelSpeeds;
use crate::error::CommandError;
use crate::safety::timeout::TickTimeout;
use crate::subsystem::drivetrain::Drivetrain;

const NAME: &str = "DriveForward";

/// Drives both sides at a fixed speed until the averaged encoder progress
/// reaches `distance_m`, or the tick backstop expires.
#[derive(Debug, Clone)]
pub struct DriveForward {
    drivetrain: Drivetrain,
    distance_m: f64,
    speed: f64,
    baseline_m: f64,
    timeout: TickTimeout,
}

impl DriveForward {
    /// # Errors
    /// `InvalidParameter` for a non-finite or negative distance, or a
    /// non-finite speed.
    pub fn new(
        drivetrain: Drivetrain,
        distance_m: f64,
        speed: f64,
        timeout_ticks: u32,
    ) -> Result<Self, CommandError> {
        let distance_m = CommandError::check_non_negative(NAME, "distance_m", distance_m)?;
        let speed = CommandError::check_finite(NAME, "speed", speed)?;
        Ok(Self {
            drivetrain,
            distance_m,
            speed,
            baseline_m: 0.0,
            timeout: TickTimeout::new(timeout_ticks),
        })
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance_m
    }

    fn progress(&self, hw: &dyn Hardware) -> Result<f64, CommandError> {
        Ok(self.drivetrain.average_meters(hw)? - self.baseline_m)
    }
}

impl Command for DriveForward {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.drivetrain.reset_encoders(hw)?;
        self.baseline_m = self.drivetrain.average_meters(hw)?;
        self.timeout.reset();
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let speeds = if self.progress(hw)? >= self.distance_m {
            WheelSpeeds::ZERO
        } else {
            WheelSpeeds::new(self.speed, self.speed)
        };
        self.drivetrain.set_motors(hw, speeds)?;
        Ok(())
    }

    fn is_finished(&mut self, hw: &dyn Hardware) -> Result<bool, CommandError> {
        if self.progress(hw)? >= self.distance_m {
            return Ok(true);
        }
        if self.timeout.tick() {
            warn!(
                ticks = self.timeout.limit(),
                target_m = self.distance_m,
                "{NAME} timed out"
            );
            return Ok(true);
        }
        Ok(false)
    }

    fn end(&mut self, hw: &mut dyn Hardware, _interrupted: bool) -> Result<(), CommandError> {
        self.drivetrain.stop(hw)?;
        Ok(())
    }
}
