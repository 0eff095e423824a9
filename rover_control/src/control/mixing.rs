//! Teleop shaping and differential-drive mixing.
//!
//! Shaping order for each joystick axis:
//!
//! ```text
//! raw ──► dead-band (rescaled) ──► cubic curve ──► × max_speed ──► mix
//!                                                    (turn: × sensitivity)
//! ```
//!
//! Every stage maps [-1, 1] into [-1, 1], so the mixed pair only needs the
//! final clamp applied by the drive subsystem when |forward| + |turn| > 1.

use rover_common::robot::config::{DriveConfig, OperatorConfig};

/// Zero inputs with |value| ≤ `deadband`, rescaling the rest so the output
/// still spans the full range (0 at the band edge, ±1 at ±1).
///
/// Non-finite inputs read as zero.
#[inline]
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if !value.is_finite() || value.abs() <= deadband {
        return 0.0;
    }
    if deadband >= 1.0 {
        return 0.0;
    }
    value.signum() * (value.abs() - deadband) / (1.0 - deadband)
}

/// Sign-preserving cubic response curve.
#[inline]
pub fn cubic(value: f64) -> f64 {
    (value * value * value).copysign(value)
}

/// Left/right drive output pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

impl WheelSpeeds {
    pub const ZERO: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    #[inline]
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// `left = forward + turn`, `right = forward − turn`.
    #[inline]
    pub fn arcade(forward: f64, turn: f64) -> Self {
        Self {
            left: forward + turn,
            right: forward - turn,
        }
    }

    /// Clamp both sides to ±|limit|. A NaN limit clamps to zero.
    #[inline]
    pub fn clamped(self, limit: f64) -> Self {
        let limit = if limit.is_nan() { 0.0 } else { limit.abs() };
        Self {
            left: self.left.clamp(-limit, limit),
            right: self.right.clamp(-limit, limit),
        }
    }
}

/// Operator shaping parameters for arcade drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeShaping {
    pub deadband: f64,
    pub max_speed: f64,
    /// Applied to the turn component only.
    pub turn_sensitivity: f64,
}

impl ArcadeShaping {
    pub fn from_config(drive: &DriveConfig, operator: &OperatorConfig) -> Self {
        Self {
            deadband: operator.deadband,
            max_speed: drive.max_speed_fraction,
            turn_sensitivity: drive.turn_sensitivity,
        }
    }

    /// Shape one raw axis value.
    #[inline]
    pub fn shape(&self, raw: f64) -> f64 {
        cubic(apply_deadband(raw, self.deadband)) * self.max_speed
    }

    /// Shape both axes and mix into a wheel pair.
    pub fn mix(&self, forward_raw: f64, turn_raw: f64) -> WheelSpeeds {
        let forward = self.shape(forward_raw);
        let turn = self.shape(turn_raw) * self.turn_sensitivity;
        WheelSpeeds::arcade(forward, turn)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
