//! Error types of the control core.
//!
//! Construction-time parameter problems, evaluation-time geometry problems
//! and hardware failures all surface as [`CommandError`]; the scheduler turns
//! any of them into an interrupted termination of the offending command.
//! Registration problems (tables full, overlapping defaults) are
//! [`SchedulerError`]s and happen before the first tick; [`SetupError`]
//! carries either while routines and bindings are being wired.

use rover_common::hal::driver::HalError;
use rover_common::hal::types::Requirements;
use thiserror::Error;

/// Failure raised by a command during construction or a lifecycle step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// A constructor argument is out of its domain (non-finite, negative).
    #[error("{command}: invalid {parameter} = {value}")]
    InvalidParameter {
        command: &'static str,
        parameter: &'static str,
        value: f64,
    },

    /// A geometry constant makes the control law undefined.
    #[error("{command}: invalid geometry, {parameter} = {value}")]
    InvalidGeometry {
        command: &'static str,
        parameter: &'static str,
        value: f64,
    },

    /// Actuator backend failure.
    #[error(transparent)]
    Hal(#[from] HalError),
}

impl CommandError {
    /// Reject non-finite or negative magnitudes.
    pub fn check_non_negative(
        command: &'static str,
        parameter: &'static str,
        value: f64,
    ) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidParameter {
                command,
                parameter,
                value,
            })
        }
    }

    /// Reject non-finite values.
    pub fn check_finite(
        command: &'static str,
        parameter: &'static str,
        value: f64,
    ) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::InvalidParameter {
                command,
                parameter,
                value,
            })
        }
    }
}

/// Registration-time scheduler failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Pending + active command slots exhausted.
    #[error("command table full ({0} slots)")]
    QueueFull(usize),

    /// No room for another trigger binding.
    #[error("binding table full ({0} slots)")]
    BindingTableFull(usize),

    /// No room for another default command.
    #[error("default command table full ({0} slots)")]
    DefaultTableFull(usize),

    /// A default command must own a non-empty requirement set.
    #[error("default command requires no actuators")]
    EmptyDefault,

    /// Default command requirement sets must be disjoint.
    #[error("default command overlaps an existing default on {0:?}")]
    DefaultOverlap(Requirements),
}

/// Failure wiring commands, defaults and bindings into a scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
