//! Rover Common Library
//!
//! Shared constants, configuration loading and the narrow hardware
//! interfaces consumed by the rover control core.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide numeric limits and defaults
//! - [`hal`] - Actuator, sensor, operator-input and clock interfaces
//! - [`robot`] - Robot tuning configuration (drive geometry, gains, timeouts)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rover_common::prelude::*;
//!
//! let config = RobotConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod robot;
