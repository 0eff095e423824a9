//! Hardware driver traits and error types.
//!
//! This module defines:
//! - `ActuatorSink` - open-loop output, velocity setpoint, encoder position
//! - `SensorSource` - range readings with a negative "invalid" sentinel
//! - `OperatorInput` - raw operator axes and buttons
//! - `Clock` - monotonic time supplied by the scheduling driver
//! - `Hardware` - everything a command needs, as one object-safe trait
//! - `HalError` - failures reported by actuator backends
//!
//! # Contracts
//!
//! | Operation | Units | Notes |
//! |-----------|-------|-------|
//! | `set_output` | fraction, [-1, 1] | callers sanitize before writing |
//! | `set_velocity` | rotations/s | closed loop inside the motor controller |
//! | `position` | rotations | cumulative, monotonic until `reset_position` |
//! | `distance` | metres | negative means "no valid reading" |

use std::time::Duration;
use thiserror::Error;

use super::types::{ActuatorId, SensorId};

/// Error types reported by actuator backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// Actuator is not present or not configured.
    #[error("Actuator {0} not available")]
    Unavailable(ActuatorId),

    /// Actuator refused the command.
    #[error("Actuator {id} rejected command: {reason}")]
    Rejected {
        /// Target actuator.
        id: ActuatorId,
        /// Backend-specific reason.
        reason: String,
    },

    /// Bus or link failure.
    #[error("Hardware communication error: {0}")]
    Communication(String),
}

/// Output side of the hardware boundary.
pub trait ActuatorSink {
    /// Set an open-loop output fraction.
    fn set_output(&mut self, id: ActuatorId, value: f64) -> Result<(), HalError>;

    /// Set a closed-loop velocity setpoint [rotations/s].
    fn set_velocity(&mut self, id: ActuatorId, rps: f64) -> Result<(), HalError>;

    /// Cumulative encoder position [rotations].
    fn position(&self, id: ActuatorId) -> Result<f64, HalError>;

    /// Zero the encoder position.
    fn reset_position(&mut self, id: ActuatorId) -> Result<(), HalError>;
}

/// Range sensor source.
///
/// Backends map every failure (timeout, out-of-range, bad status) onto a
/// negative return value; this call never fails.
pub trait SensorSource {
    /// Distance to target [m], negative when invalid.
    fn distance(&self, id: SensorId) -> f64;
}

/// Raw operator controls.
pub trait OperatorInput {
    /// Axis value in [-1, 1]; unknown axes read 0.
    fn axis(&self, index: usize) -> f64;

    /// Button level; unknown buttons read released.
    fn button(&self, index: usize) -> bool;
}

/// Monotonic time since the driver started.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Everything a command may touch during a tick.
///
/// Blanket-implemented for any type providing the four capabilities, so a
/// driver only implements the individual traits.
pub trait Hardware: ActuatorSink + SensorSource + OperatorInput + Clock {}

impl<T: ActuatorSink + SensorSource + OperatorInput + Clock + ?Sized> Hardware for T {}
