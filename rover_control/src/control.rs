//! Control law root.
//!
//! Generic PID controller plus the teleop shaping and differential mixing
//! shared by the drive primitives.

pub mod mixing;
pub mod pid;
