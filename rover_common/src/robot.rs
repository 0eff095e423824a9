//! Robot tuning configuration.
//!
//! Drive geometry, speed limits, PID gains, tolerances and timeout backstops.
//! None of these are parsed by the control core itself; the binary loads a
//! [`config::RobotConfig`] and hands the sections to the constructors.

pub mod config;

pub use config::RobotConfig;
