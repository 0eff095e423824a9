//! Encoder-delta turn in place.
//!
//! Achieved rotation is `(ΔL − ΔR) / track_width` in radians, positive for
//! clockwise (left side forward).

use rover_common::consts::MIN_TURN_DEGREES;
use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use tracing::warn;

use crate::command::lifecycle::Command;
use crate::control::mixing::WheelSpeeds;
use crate::error::CommandError;
use crate::safety::timeout::TickTimeout;
use crate::subsystem::drivetrain::Drivetrain;

const NAME: &str = "Turn";

#[derive(Debug, Clone)]
pub struct Turn {
    drivetrain: Drivetrain,
    target_deg: f64,
    speed: f64,
    left_baseline_m: f64,
    right_baseline_m: f64,
    timeout: TickTimeout,
}

impl Turn {
    /// # Errors
    /// `InvalidParameter` for a non-finite angle or speed.
    pub fn new(
        drivetrain: Drivetrain,
        target_deg: f64,
        speed: f64,
        timeout_ticks: u32,
    ) -> Result<Self, CommandError> {
        let target_deg = CommandError::check_finite(NAME, "target_deg", target_deg)?;
        let speed = CommandError::check_finite(NAME, "speed", speed)?.abs();
        Ok(Self {
            drivetrain,
            target_deg,
            speed,
            left_baseline_m: 0.0,
            right_baseline_m: 0.0,
            timeout: TickTimeout::new(timeout_ticks),
        })
    }

    /// Targets this close to zero complete without moving.
    #[inline]
    fn is_trivial(&self) -> bool {
        self.target_deg.abs() < MIN_TURN_DEGREES
    }

    /// A turn needs a positive track width to convert encoder travel into
    /// an angle.
    fn check_geometry(&self) -> Result<f64, CommandError> {
        let track_width = self.drivetrain.track_width();
        if track_width > 0.0 && track_width.is_finite() {
            Ok(track_width)
        } else {
            Err(CommandError::InvalidGeometry {
                command: NAME,
                parameter: "track_width_m",
                value: track_width,
            })
        }
    }

    /// Rotation since activation [deg].
    pub fn achieved_degrees(&self, hw: &dyn Hardware) -> Result<f64, CommandError> {
        let track_width = self.check_geometry()?;
        let left = self.drivetrain.left_meters(hw)? - self.left_baseline_m;
        let right = self.drivetrain.right_meters(hw)? - self.right_baseline_m;
        Ok(((left - right) / track_width).to_degrees())
    }
}

impl Command for Turn {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.timeout.reset();
        if self.is_trivial() {
            return Ok(());
        }
        self.check_geometry()?;
        self.left_baseline_m = self.drivetrain.left_meters(hw)?;
        self.right_baseline_m = self.drivetrain.right_meters(hw)?;
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let speeds = if self.is_trivial() {
            WheelSpeeds::ZERO
        } else {
            self.check_geometry()?;
            let s = self.speed.copysign(self.target_deg);
            WheelSpeeds::new(s, -s)
        };
        self.drivetrain.set_motors(hw, speeds)?;
        Ok(())
    }

    fn is_finished(&mut self, hw: &dyn Hardware) -> Result<bool, CommandError> {
        if self.is_trivial() {
            return Ok(true);
        }

        let achieved = self.achieved_degrees(hw)?;
        let reached = if self.target_deg > 0.0 {
            achieved >= self.target_deg
        } else {
            achieved <= self.target_deg
        };
        if reached {
            return Ok(true);
        }

        if self.timeout.tick() {
            warn!(
                ticks = self.timeout.limit(),
                target_deg = self.target_deg,
                achieved_deg = achieved,
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
