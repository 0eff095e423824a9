//! Hardware interfaces consumed by the control core.
//!
//! The core never talks to a motor controller or range finder directly.
//! It writes through [`driver::ActuatorSink`], reads through
//! [`driver::SensorSource`] and [`driver::OperatorInput`], and takes time
//! from [`driver::Clock`]. Real backends and the simulation driver implement
//! these traits.

pub mod driver;
pub mod types;
