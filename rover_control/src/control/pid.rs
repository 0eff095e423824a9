//! PID controller with rectangular integration and a backward-difference
//! derivative.
//!
//! The controller never clamps its own output; callers bound the result
//! (the alignment loops clamp to their configured `max_output`, the drive
//! subsystem sanitizes everything it writes).

use rover_common::robot::config::PidGains;

/// Feedback controller owning its setpoint, gains and error memory.
///
/// Created once per primitive instance and reset at every activation, so
/// the first `calculate` after `reset` only depends on the measurement.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    /// Loop period [s].
    period: f64,
    setpoint: f64,
    tolerance: f64,
    /// ∫e dt.
    integral: f64,
    /// Error of the previous `calculate`.
    prev_error: f64,
    /// Error of the most recent `calculate`.
    error: f64,
    /// Set by `calculate`, cleared by `reset`.
    has_measurement: bool,
}

impl PidController {
    /// Create a controller with setpoint 0 and tolerance 0.05.
    pub fn new(kp: f64, ki: f64, kd: f64, period: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            period,
            setpoint: 0.0,
            tolerance: 0.05,
            integral: 0.0,
            prev_error: 0.0,
            error: 0.0,
            has_measurement: false,
        }
    }

    /// Create a controller from configured gains, taking their tolerance.
    pub fn from_gains(gains: &PidGains, period: f64) -> Self {
        let mut pid = Self::new(gains.kp, gains.ki, gains.kd, period);
        pid.set_tolerance(gains.tolerance);
        pid
    }

    /// Replace the gains. Error memory is kept.
    #[inline]
    pub fn configure(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    #[inline]
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    #[inline]
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.abs();
    }

    /// Error of the most recent `calculate` (setpoint − measurement).
    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Zero integral and derivative memory. Setpoint, gains and tolerance stay.
    #[inline]
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.error = 0.0;
        self.has_measurement = false;
    }

    /// Advance one period and return `kp·e + ki·∫e + kd·de/dt`.
    ///
    /// A non-positive period yields 0 without touching state.
    pub fn calculate(&mut self, measurement: f64) -> f64 {
        if self.period <= 0.0 {
            return 0.0;
        }

        let error = self.setpoint - measurement;

        // ── I term ──────────────────────────────────────────────
        self.integral += error * self.period;

        // ── D term ──────────────────────────────────────────────
        let derivative = (error - self.prev_error) / self.period;

        self.prev_error = error;
        self.error = error;
        self.has_measurement = true;

        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// |error| ≤ tolerance for the most recent `calculate`.
    ///
    /// False until the first `calculate` after construction or `reset`.
    #[inline]
    pub fn at_setpoint(&self) -> bool {
        self.has_measurement && self.error.abs() <= self.tolerance
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
