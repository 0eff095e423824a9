//! Continuous teleop arcade drive.

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use rover_common::robot::RobotConfig;

use crate::command::lifecycle::Command;
use crate::control::mixing::{ArcadeShaping, WheelSpeeds};
use crate::error::CommandError;
use crate::subsystem::drivetrain::Drivetrain;

/// Reads two operator axes every tick and drives the wheel pair.
/// Never finishes on its own.
#[derive(Debug, Clone)]
pub struct ArcadeDrive {
    drivetrain: Drivetrain,
    shaping: ArcadeShaping,
    speed_axis: usize,
    turn_axis: usize,
    invert_speed: bool,
    last: WheelSpeeds,
}

impl ArcadeDrive {
    pub fn new(
        drivetrain: Drivetrain,
        shaping: ArcadeShaping,
        speed_axis: usize,
        turn_axis: usize,
        invert_speed: bool,
    ) -> Self {
        Self {
            drivetrain,
            shaping,
            speed_axis,
            turn_axis,
            invert_speed,
            last: WheelSpeeds::ZERO,
        }
    }

    pub fn from_config(config: &RobotConfig) -> Self {
        Self::new(
            Drivetrain::new(&config.drive),
            ArcadeShaping::from_config(&config.drive, &config.operator),
            config.operator.speed_axis,
            config.operator.turn_axis,
            config.operator.invert_speed_axis,
        )
    }

    /// Pair written on the most recent tick.
    #[inline]
    pub fn last_output(&self) -> WheelSpeeds {
        self.last
    }
}

impl Command for ArcadeDrive {
    fn name(&self) -> &'static str {
        "ArcadeDrive"
    }

    fn requirements(&self) -> Requirements {
        Requirements::DRIVETRAIN
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let raw_speed = hw.axis(self.speed_axis);
        let forward = if self.invert_speed { -raw_speed } else { raw_speed };
        let turn = hw.axis(self.turn_axis);

        self.last = self
            .drivetrain
            .set_motors(hw, self.shaping.mix(forward, turn))?;
        Ok(())
    }

    fn end(&mut self, hw: &mut dyn Hardware, _interrupted: bool) -> Result<(), CommandError> {
        self.drivetrain.stop(hw)?;
        self.last = WheelSpeeds::ZERO;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRobot;
    use rover_common::hal::types::ActuatorId;

    #[test]
    fn pushing_stick_forward_drives_forward() {
        let config = RobotConfig::default();
        let mut sim = SimRobot::default();
        let mut cmd = ArcadeDrive::from_config(&config);

        // Joystick Y reads negative when pushed forward.
        sim.set_axis(config.operator.speed_axis, -1.0);
        cmd.execute(&mut sim).unwrap();
        assert!((sim.output(ActuatorId::DriveLeft) - 0.7).abs() < 1e-12);
        assert!((sim.output(ActuatorId::DriveRight) - 0.7).abs() < 1e-12);

        cmd.end(&mut sim, true).unwrap();
        assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
        assert_eq!(cmd.last_output(), WheelSpeeds::ZERO);
    }

    #[test]
    fn output_is_clamped_at_full_stick() {
        let mut config = RobotConfig::default();
        config.drive.max_speed_fraction = 1.0;
        config.drive.turn_sensitivity = 1.0;
        let mut sim = SimRobot::default();
        let mut cmd = ArcadeDrive::from_config(&config);

        sim.set_axis(config.operator.speed_axis, -1.0);
        sim.set_axis(config.operator.turn_axis, 1.0);
        cmd.execute(&mut sim).unwrap();
        assert_eq!(cmd.last_output(), WheelSpeeds::new(1.0, 0.0));
    }

    #[test]
    fn inside_deadband_writes_zero() {
        let config = RobotConfig::default();
        let mut sim = SimRobot::default();
        let mut cmd = ArcadeDrive::from_config(&config);

        sim.set_axis(config.operator.speed_axis, 0.04);
        sim.set_axis(config.operator.turn_axis, -0.05);
        cmd.execute(&mut sim).unwrap();
        assert_eq!(cmd.last_output(), WheelSpeeds::ZERO);
        assert!(!cmd.is_finished(&sim).unwrap());
    }
}
