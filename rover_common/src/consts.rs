//! System-wide constants for the rover workspace.
//!
//! Single source of truth for numeric limits and the defaults used by
//! [`crate::robot::RobotConfig`] when a TOML field is omitted.

use static_assertions::const_assert;

/// Default control period in milliseconds (50 Hz).
pub const DEFAULT_TICK_PERIOD_MS: u64 = 20;

/// Accepted control period range [ms].
pub const TICK_PERIOD_MS_MIN: u64 = 1;
pub const TICK_PERIOD_MS_MAX: u64 = 1000;

/// Full open-loop actuator range; outputs are clamped to ±this value.
pub const OUTPUT_LIMIT: f64 = 1.0;

/// Canonical "invalid" distance returned by sensor sources.
pub const INVALID_DISTANCE: f64 = -1.0;

/// Turn targets with magnitude below this many degrees finish immediately.
pub const MIN_TURN_DEGREES: f64 = 0.1;

/// Iteration backstops for encoder-bounded primitives (~4 s / ~6 s at 50 Hz).
pub const DRIVE_FORWARD_TIMEOUT_TICKS: u32 = 200;
pub const TURN_TIMEOUT_TICKS: u32 = 300;
pub const ACTUATOR_RUN_TIMEOUT_TICKS: u32 = 200;

/// Wall-clock backstop for sensor positioning [s].
pub const POSITIONING_TIMEOUT_S: f64 = 5.0;

/// Scheduler table capacities (fixed at registration time).
pub const MAX_ACTIVE_COMMANDS: usize = 16;
pub const MAX_BINDINGS: usize = 16;
pub const MAX_DEFAULT_COMMANDS: usize = 4;

/// Number of addressable operator axes and buttons.
pub const MAX_OPERATOR_AXES: usize = 8;
pub const MAX_OPERATOR_BUTTONS: usize = 16;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/rover.toml";

const_assert!(DEFAULT_TICK_PERIOD_MS >= TICK_PERIOD_MS_MIN);
const_assert!(DEFAULT_TICK_PERIOD_MS <= TICK_PERIOD_MS_MAX);
const_assert!(MAX_DEFAULT_COMMANDS <= MAX_ACTIVE_COMMANDS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backstops_are_positive() {
        assert!(DRIVE_FORWARD_TIMEOUT_TICKS > 0);
        assert!(TURN_TIMEOUT_TICKS > 0);
        assert!(ACTUATOR_RUN_TIMEOUT_TICKS > 0);
        assert!(POSITIONING_TIMEOUT_S > 0.0);
    }

    #[test]
    fn sentinel_is_negative() {
        assert!(INVALID_DISTANCE < 0.0);
        assert!(OUTPUT_LIMIT > 0.0 && OUTPUT_LIMIT <= 1.0);
    }
}
