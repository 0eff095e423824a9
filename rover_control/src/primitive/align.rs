//! Dual-sensor alignment against a flat target.
//!
//! Two PID loops run every tick while both range readings are valid:
//!
//! | Loop | Measurement | Setpoint | Output |
//! |------|-------------|----------|--------|
//! | alignment | left − right | 0 | turn, clamped to `alignment.max_output` |
//! | distance | (left + right) / 2 | target | drive, clamped to `distance.max_output` |
//!
//! Either reading invalid writes exactly (0, 0) and raises one warning per
//! fault episode. The primitive never finishes on its own.

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use rover_common::robot::config::AlignmentConfig;
use tracing::{info, warn};

use crate::command::lifecycle::Command;
use crate::control::mixing::WheelSpeeds;
use crate::control::pid::PidController;
use crate::error::CommandError;
use crate::safety::latch::WarnLatch;
use crate::subsystem::drivetrain::Drivetrain;
use crate::subsystem::range::RangeSensors;

#[derive(Debug, Clone)]
pub struct AlignWithSensors {
    drivetrain: Drivetrain,
    sensors: RangeSensors,
    alignment: PidController,
    distance: PidController,
    max_turn: f64,
    max_drive: f64,
    target_m: f64,
    invalid: WarnLatch,
    last: WheelSpeeds,
}

impl AlignWithSensors {
    /// Align to the configured target distance.
    pub fn new(drivetrain: Drivetrain, config: &AlignmentConfig, period_s: f64) -> Self {
        Self::with_target(drivetrain, config, period_s, config.target_distance_m)
    }

    pub fn with_target(
        drivetrain: Drivetrain,
        config: &AlignmentConfig,
        period_s: f64,
        target_m: f64,
    ) -> Self {
        let mut alignment = PidController::from_gains(&config.alignment, period_s);
        alignment.set_setpoint(0.0);
        let mut distance = PidController::from_gains(&config.distance, period_s);
        distance.set_setpoint(target_m);

        Self {
            drivetrain,
            sensors: RangeSensors,
            alignment,
            distance,
            max_turn: config.alignment.max_output,
            max_drive: config.distance.max_output,
            target_m,
            invalid: WarnLatch::new(),
            last: WheelSpeeds::ZERO,
        }
    }

    /// Both loops within tolerance on the latest tick.
    #[inline]
    pub fn at_setpoint(&self) -> bool {
        self.alignment.at_setpoint() && self.distance.at_setpoint()
    }

    #[inline]
    pub fn alignment_at_setpoint(&self) -> bool {
        self.alignment.at_setpoint()
    }

    #[inline]
    pub fn distance_at_setpoint(&self) -> bool {
        self.distance.at_setpoint()
    }

    /// Pair written on the most recent tick.
    #[inline]
    pub fn last_output(&self) -> WheelSpeeds {
        self.last
    }
}

impl Command for AlignWithSensors {
    fn name(&self) -> &'static str {
        "AlignWithSensors"
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn initialize(&mut self, _hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.alignment.reset();
        self.distance.reset();
        self.invalid.clear();
        self.last = WheelSpeeds::ZERO;
        info!(target_m = self.target_m, "alignment started");
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let pair = self.sensors.read(hw);
        let Some((left, right)) = pair.valid() else {
            if self.invalid.raise() {
                warn!(
                    left = pair.left.raw(),
                    right = pair.right.raw(),
                    "range sensors invalid, holding drivetrain"
                );
            }
            self.drivetrain.stop(hw)?;
            self.last = WheelSpeeds::ZERO;
            return Ok(());
        };
        self.invalid.clear();

        let turn = self
            .alignment
            .calculate(left - right)
            .clamp(-self.max_turn, self.max_turn);
        let drive = self
            .distance
            .calculate((left + right) / 2.0)
            .clamp(-self.max_drive, self.max_drive);

        let speeds = WheelSpeeds::arcade(drive, turn).clamped(self.drivetrain.output_limit());
        self.last = self.drivetrain.set_motors(hw, speeds)?;
        Ok(())
    }

    fn end(&mut self, hw: &mut dyn Hardware, interrupted: bool) -> Result<(), CommandError> {
        self.drivetrain.stop(hw)?;
        self.last = WheelSpeeds::ZERO;
        info!(interrupted, at_setpoint = self.at_setpoint(), "alignment ended");
        Ok(())
    }
}
