//! Motion primitives.
//!
//! Each primitive implements [`crate::command::lifecycle::Command`] and owns
//! its progress snapshot, PID loops, timeout counters and warning latches.
//! Construction validates parameters and never touches hardware; baselines
//! are captured in `initialize` and every terminal step writes zero.

pub mod actuator;
pub mod align;
pub mod arcade;
pub mod drive_forward;
pub mod positioning;
pub mod turn;
