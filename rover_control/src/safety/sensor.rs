//! Sentinel-valued range readings.
//!
//! A negative (or non-finite) distance means "no valid reading". Consumers
//! go through [`DistanceReading`] so invalid values short-circuit before any
//! control math sees them.

use rover_common::consts::INVALID_DISTANCE;

/// One range reading [m].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceReading(f64);

impl DistanceReading {
    pub const INVALID: Self = Self(INVALID_DISTANCE);

    #[inline]
    pub const fn from_raw(raw: f64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// The distance, or `None` for the sentinel.
    #[inline]
    pub fn meters(self) -> Option<f64> {
        self.is_valid().then_some(self.0)
    }

    /// Raw value including the sentinel (for telemetry).
    #[inline]
    pub const fn raw(self) -> f64 {
        self.0
    }
}

/// Simultaneous left/right readings of the front sensor pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePair {
    pub left: DistanceReading,
    pub right: DistanceReading,
}

impl RangePair {
    #[inline]
    pub fn both_valid(&self) -> bool {
        self.left.is_valid() && self.right.is_valid()
    }

    /// Both readings, or `None` if either is invalid.
    #[inline]
    pub fn valid(&self) -> Option<(f64, f64)> {
        Some((self.left.meters()?, self.right.meters()?))
    }

    /// Mean of both readings, `None` if either is invalid.
    #[inline]
    pub fn average(&self) -> Option<f64> {
        self.valid().map(|(l, r)| (l + r) / 2.0)
    }

    /// `left − right`, `None` if either is invalid.
    #[inline]
    pub fn difference(&self) -> Option<f64> {
        self.valid().map(|(l, r)| l - r)
    }

    /// Each reading individually within `tolerance` of `target`.
    pub fn both_within(&self, target: f64, tolerance: f64) -> bool {
        self.valid().is_some_and(|(l, r)| {
            (l - target).abs() <= tolerance && (r - target).abs() <= tolerance
        })
    }
}
