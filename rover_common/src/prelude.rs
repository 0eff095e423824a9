//! Convenience re-exports for rover crates.
//!
//! ```rust
//! use rover_common::prelude::*;
//! ```

pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, Validate};
pub use crate::consts::*;
pub use crate::hal::driver::{
    ActuatorSink, Clock, HalError, Hardware, OperatorInput, SensorSource,
};
pub use crate::hal::types::{ActuatorId, Requirements, SensorId};
pub use crate::robot::RobotConfig;
pub use crate::robot::config::{
    ActuatorConfig, ActuatorControl, AlignmentConfig, AutoConfig, CycleConfig, DriveConfig,
    OperatorConfig, PidGains, PositioningConfig, RoutineKind, TimeoutConfig,
};
