//! Single-axis roller actuators (feeder, intake).

use rover_common::hal::driver::{ActuatorSink, HalError};
use rover_common::hal::types::ActuatorId;
use rover_common::robot::config::{ActuatorConfig, ActuatorControl};

use crate::safety::output::sanitize_output;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roller {
    id: ActuatorId,
    config: ActuatorConfig,
    output_limit: f64,
}

impl Roller {
    pub fn new(id: ActuatorId, config: ActuatorConfig, output_limit: f64) -> Self {
        Self {
            id,
            config,
            output_limit,
        }
    }

    #[inline]
    pub fn id(&self) -> ActuatorId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Command the configured run setpoint.
    pub fn run<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        match self.config.control {
            ActuatorControl::Velocity => {
                let rps = sanitize_output(self.config.velocity_rps, self.config.max_velocity_rps);
                hw.set_velocity(self.id, rps)
            }
            ActuatorControl::OpenLoop => hw.set_output(
                self.id,
                sanitize_output(self.config.open_loop_output, self.output_limit),
            ),
        }
    }

    #[inline]
    pub fn stop<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        hw.set_output(self.id, 0.0)
    }

    /// Open-loop output, sanitized.
    #[inline]
    pub fn set_output<H: ActuatorSink + ?Sized>(&self, hw: &mut H, value: f64) -> Result<(), HalError> {
        hw.set_output(self.id, sanitize_output(value, self.output_limit))
    }

    /// Encoder position [rotations].
    #[inline]
    pub fn position<H: ActuatorSink + ?Sized>(&self, hw: &H) -> Result<f64, HalError> {
        hw.position(self.id)
    }

    #[inline]
    pub fn reset_position<H: ActuatorSink + ?Sized>(&self, hw: &mut H) -> Result<(), HalError> {
        hw.reset_position(self.id)
    }
}
