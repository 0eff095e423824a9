//! Subsystem root.
//!
//! Thin, stateless-per-tick wrappers that translate between the control
//! laws (metres, wheel pairs, "run"/"stop") and the raw HAL traits
//! (rotations, per-actuator outputs). Every output written here passes
//! through [`crate::safety::output::sanitize_output`].

pub mod drivetrain;
pub mod range;
pub mod roller;
