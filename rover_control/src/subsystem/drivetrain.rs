//! Differential drivetrain.
//!
//! Actuator handles are logical sides: positive output drives that side
//! forward and its encoder counts up. Physical motor inversion belongs to
//! the backend.

use rover_common::hal::driver::{ActuatorSink, HalError};
use rover_common::hal::types::ActuatorId;
use rover_common::robot::config::DriveConfig;

use crate::control::mixing::WheelSpeeds;
use crate::safety::output::sanitize_output;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drivetrain {
    meters_per_rotation: f64,
    track_width_m: f64,
    output_limit: f64,
    brake_power: f64,
}

impl Drivetrain {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            meters_per_rotation: config.meters_per_rotation(),
            track_width_m: config.track_width_m,
            output_limit: config.output_limit,
            brake_power: config.disabled_brake_power,
        }
    }

    #[inline]
    pub fn track_width(&self) -> f64 {
        self.track_width_m
    }

    #[inline]
    pub fn output_limit(&self) -> f64 {
        self.output_limit
    }

    #[inline]
    pub fn meters_per_rotation(&self) -> f64 {
        self.meters_per_rotation
    }

    /// Disabled-mode output [fraction].
    #[inline]
    pub fn brake_power(&self) -> f64 {
        self.brake_power
    }

    /// Sanitize and write both sides. Returns the pair actually written.
    pub fn set_motors<H>(&self, hw: &mut H, speeds: WheelSpeeds) -> Result<WheelSpeeds, HalError>
    where
        H: ActuatorSink + ?Sized,
    {
        let written = WheelSpeeds {
            left: sanitize_output(speeds.left, self.output_limit),
            right: sanitize_output(speeds.right, self.output_limit),
        };
        hw.set_output(ActuatorId::DriveLeft, written.left)?;
        hw.set_output(ActuatorId::DriveRight, written.right)?;
        Ok(written)
    }

    #[inline]
    pub fn stop<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        self.set_motors(hw, WheelSpeeds::ZERO).map(|_| ())
    }

    /// Apply the configured disabled-mode brake output to both sides.
    pub fn brake<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        self.set_motors(hw, WheelSpeeds::new(self.brake_power, self.brake_power))
            .map(|_| ())
    }

    pub fn left_meters<H: ActuatorSink + ?Sized>(&self, hw: &H) -> Result<f64, HalError> {
        Ok(hw.position(ActuatorId::DriveLeft)? * self.meters_per_rotation)
    }

    pub fn right_meters<H: ActuatorSink + ?Sized>(&self, hw: &H) -> Result<f64, HalError> {
        Ok(hw.position(ActuatorId::DriveRight)? * self.meters_per_rotation)
    }

    /// Forward progress: mean of both sides [m].
    pub fn average_meters<H: ActuatorSink + ?Sized>(&self, hw: &H) -> Result<f64, HalError> {
        Ok((self.left_meters(hw)? + self.right_meters(hw)?) / 2.0)
    }

    pub fn reset_encoders<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        hw.reset_position(ActuatorId::DriveLeft)?;
        hw.reset_position(ActuatorId::DriveRight)
    }
}
