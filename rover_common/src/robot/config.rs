//! Configuration structures for the rover control core.
//!
//! All sections deserialize from TOML and fall back to the defaults below for
//! any omitted field, so a file only needs to list what it changes.
//!
//! ```toml
//! [shared]
//! service_name = "rover-sim"
//!
//! [drive]
//! track_width_m = 0.6
//!
//! [alignment.distance]
//! kp = 1.2
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ConfigError, SharedConfig, Validate};
use crate::consts::{
    ACTUATOR_RUN_TIMEOUT_TICKS, DEFAULT_TICK_PERIOD_MS, DRIVE_FORWARD_TIMEOUT_TICKS,
    MAX_OPERATOR_AXES, MAX_OPERATOR_BUTTONS, OUTPUT_LIMIT, POSITIONING_TIMEOUT_S,
    TICK_PERIOD_MS_MAX, TICK_PERIOD_MS_MIN, TURN_TIMEOUT_TICKS,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete robot configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    pub cycle: CycleConfig,
    pub drive: DriveConfig,
    pub auto: AutoConfig,
    pub operator: OperatorConfig,
    pub alignment: AlignmentConfig,
    pub positioning: PositioningConfig,
    #[serde(deserialize_with = "feeder_section")]
    pub feeder: ActuatorConfig,
    #[serde(deserialize_with = "intake_section")]
    pub intake: ActuatorConfig,
    pub timeouts: TimeoutConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            cycle: CycleConfig::default(),
            drive: DriveConfig::default(),
            auto: AutoConfig::default(),
            operator: OperatorConfig::default(),
            alignment: AlignmentConfig::default(),
            positioning: PositioningConfig::default(),
            feeder: ActuatorConfig::feeder(),
            intake: ActuatorConfig::intake(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Validate for RobotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.cycle.validate()?;
        self.drive.validate()?;
        self.auto.validate()?;
        self.operator.validate()?;
        self.alignment.validate()?;
        self.positioning.validate()?;
        self.feeder.validate_named("feeder")?;
        self.intake.validate_named("intake")?;
        self.timeouts.validate()?;
        Ok(())
    }
}

// ─── Cycle ──────────────────────────────────────────────────────────

/// Scheduling period of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Tick period [ms] (default: 20 = 50 Hz).
    pub tick_period_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl CycleConfig {
    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Tick period in seconds, as used by the PID integral/derivative terms.
    #[inline]
    pub fn period_s(&self) -> f64 {
        self.period().as_secs_f64()
    }
}

impl Validate for CycleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(TICK_PERIOD_MS_MIN..=TICK_PERIOD_MS_MAX).contains(&self.tick_period_ms) {
            return Err(ConfigError::ValidationError(format!(
                "cycle.tick_period_ms {} out of range [{}, {}]",
                self.tick_period_ms, TICK_PERIOD_MS_MIN, TICK_PERIOD_MS_MAX
            )));
        }
        Ok(())
    }
}

// ─── Drive ──────────────────────────────────────────────────────────

/// Differential drivetrain geometry and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Wheel diameter [m] (default: 2 in).
    pub wheel_diameter_m: f64,
    /// Motor rotations per wheel rotation.
    pub gear_ratio: f64,
    /// Distance between left and right wheel contact patches [m] (default: 24 in).
    pub track_width_m: f64,
    /// Teleop speed scale applied after the response curve.
    pub max_speed_fraction: f64,
    /// Extra multiplier applied to the teleop turn component only.
    pub turn_sensitivity: f64,
    /// Symmetric clamp applied to every drive output.
    pub output_limit: f64,
    /// Output applied to every actuator while disabled (negative = reverse).
    /// Zero leaves the motors idle.
    pub disabled_brake_power: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_m: 0.0508,
            gear_ratio: 3.0,
            track_width_m: 0.6096,
            max_speed_fraction: 0.7,
            turn_sensitivity: 0.5,
            output_limit: OUTPUT_LIMIT,
            disabled_brake_power: 0.0,
        }
    }
}

impl DriveConfig {
    /// Linear wheel travel per motor rotation [m].
    #[inline]
    pub fn meters_per_rotation(&self) -> f64 {
        self.wheel_diameter_m * std::f64::consts::PI / self.gear_ratio
    }
}

impl Validate for DriveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("drive.wheel_diameter_m", self.wheel_diameter_m)?;
        positive("drive.gear_ratio", self.gear_ratio)?;
        positive("drive.track_width_m", self.track_width_m)?;
        in_range("drive.max_speed_fraction", self.max_speed_fraction, 0.0, 1.0)?;
        in_range("drive.turn_sensitivity", self.turn_sensitivity, 0.0, 2.0)?;
        in_range("drive.output_limit", self.output_limit, 0.0, OUTPUT_LIMIT)?;
        positive("drive.output_limit", self.output_limit)?;
        in_range(
            "drive.disabled_brake_power",
            self.disabled_brake_power,
            -self.output_limit,
            self.output_limit,
        )
    }
}

// ─── Autonomous ─────────────────────────────────────────────────────

/// Named autonomous routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    /// Drive forward `drive_forward_distance_m`.
    #[default]
    DriveForward,
    /// Turn in place `turn_degrees`.
    Turn,
    /// Drive forward, then turn.
    DriveAndTurn,
    /// Position against the range sensors, wait, then run the feeder.
    PositionAndFeed,
}

/// Fixed speeds and targets for the autonomous primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfig {
    pub routine: RoutineKind,
    pub drive_forward_distance_m: f64,
    pub drive_speed: f64,
    pub turn_speed: f64,
    pub turn_degrees: f64,
    /// Pause between positioning and feeding [s].
    pub settle_delay_s: f64,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            routine: RoutineKind::default(),
            drive_forward_distance_m: 0.5,
            drive_speed: 0.5,
            turn_speed: 0.4,
            turn_degrees: 90.0,
            settle_delay_s: 0.5,
        }
    }
}

impl Validate for AutoConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("auto.drive_forward_distance_m", self.drive_forward_distance_m)?;
        in_range("auto.drive_speed", self.drive_speed, 0.0, OUTPUT_LIMIT)?;
        in_range("auto.turn_speed", self.turn_speed, 0.0, OUTPUT_LIMIT)?;
        finite("auto.turn_degrees", self.turn_degrees)?;
        non_negative("auto.settle_delay_s", self.settle_delay_s)
    }
}

// ─── Operator ───────────────────────────────────────────────────────

/// Joystick mapping and teleop shaping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Axis magnitudes at or below this value read as zero.
    pub deadband: f64,
    pub speed_axis: usize,
    pub turn_axis: usize,
    /// Joystick Y reads negative when pushed forward.
    pub invert_speed_axis: bool,
    /// Held: run the intake.
    pub intake_button: usize,
    /// Pressed: toggle the feeder.
    pub feeder_button: usize,
    /// Held: align against the range sensors.
    pub align_button: usize,
    /// Pressed: drive to the target range.
    pub position_button: usize,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            deadband: 0.05,
            speed_axis: 1,
            turn_axis: 0,
            invert_speed_axis: true,
            intake_button: 6,
            feeder_button: 5,
            align_button: 7,
            position_button: 3,
        }
    }
}

impl Validate for OperatorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.deadband) {
            return Err(ConfigError::ValidationError(format!(
                "operator.deadband {} out of range [0, 1)",
                self.deadband
            )));
        }
        for (name, axis) in [
            ("operator.speed_axis", self.speed_axis),
            ("operator.turn_axis", self.turn_axis),
        ] {
            if axis >= MAX_OPERATOR_AXES {
                return Err(ConfigError::ValidationError(format!(
                    "{name} {axis} exceeds {MAX_OPERATOR_AXES} axes"
                )));
            }
        }
        let buttons = [
            ("operator.intake_button", self.intake_button),
            ("operator.feeder_button", self.feeder_button),
            ("operator.align_button", self.align_button),
            ("operator.position_button", self.position_button),
        ];
        for (i, (name, button)) in buttons.iter().enumerate() {
            if *button >= MAX_OPERATOR_BUTTONS {
                return Err(ConfigError::ValidationError(format!(
                    "{name} {button} exceeds {MAX_OPERATOR_BUTTONS} buttons"
                )));
            }
            if let Some((other, _)) = buttons[..i].iter().find(|(_, b)| b == button) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} shares button {button} with {other}"
                )));
            }
        }
        Ok(())
    }
}

// ─── PID ────────────────────────────────────────────────────────────

/// Gains, tolerance and output bound of one PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// `at_setpoint` band: |error| ≤ tolerance.
    pub tolerance: f64,
    /// Callers clamp the loop output to ±max_output.
    pub max_output: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            tolerance: 0.01,
            max_output: OUTPUT_LIMIT,
        }
    }
}

/// A `PidGains` table as written in the file; absent keys stay `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PidGainsTable {
    kp: Option<f64>,
    ki: Option<f64>,
    kd: Option<f64>,
    tolerance: Option<f64>,
    max_output: Option<f64>,
}

impl PidGainsTable {
    fn over(self, base: PidGains) -> PidGains {
        PidGains {
            kp: self.kp.unwrap_or(base.kp),
            ki: self.ki.unwrap_or(base.ki),
            kd: self.kd.unwrap_or(base.kd),
            tolerance: self.tolerance.unwrap_or(base.tolerance),
            max_output: self.max_output.unwrap_or(base.max_output),
        }
    }
}

impl PidGains {
    fn validate_named(&self, section: &str) -> Result<(), ConfigError> {
        non_negative(&format!("{section}.kp"), self.kp)?;
        non_negative(&format!("{section}.ki"), self.ki)?;
        non_negative(&format!("{section}.kd"), self.kd)?;
        non_negative(&format!("{section}.tolerance"), self.tolerance)?;
        in_range(
            &format!("{section}.max_output"),
            self.max_output,
            0.0,
            OUTPUT_LIMIT,
        )
    }
}

// ─── Range-Sensor Primitives ────────────────────────────────────────

/// Dual-sensor alignment loops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Distance setpoint for the averaged reading [m].
    pub target_distance_m: f64,
    /// Loop on (left − right), setpoint 0.
    #[serde(deserialize_with = "alignment_gains")]
    pub alignment: PidGains,
    /// Loop on the averaged reading, setpoint `target_distance_m`.
    #[serde(deserialize_with = "distance_gains")]
    pub distance: PidGains,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            target_distance_m: 0.5,
            alignment: PidGains {
                kp: 2.0,
                ki: 0.0,
                kd: 0.05,
                tolerance: 0.01,
                max_output: 0.3,
            },
            distance: PidGains {
                kp: 1.5,
                ki: 0.0,
                kd: 0.02,
                tolerance: 0.02,
                max_output: 0.4,
            },
        }
    }
}

fn alignment_gains<'de, D: Deserializer<'de>>(d: D) -> Result<PidGains, D::Error> {
    PidGainsTable::deserialize(d).map(|t| t.over(AlignmentConfig::default().alignment))
}

fn distance_gains<'de, D: Deserializer<'de>>(d: D) -> Result<PidGains, D::Error> {
    PidGainsTable::deserialize(d).map(|t| t.over(AlignmentConfig::default().distance))
}

impl Validate for AlignmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("alignment.target_distance_m", self.target_distance_m)?;
        self.alignment.validate_named("alignment.alignment")?;
        self.distance.validate_named("alignment.distance")
    }
}

/// Fixed-speed drive into a target range window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    pub target_distance_m: f64,
    pub tolerance_m: f64,
    pub speed: f64,
    pub timeout_s: f64,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self {
            target_distance_m: 0.5,
            tolerance_m: 0.02,
            speed: 0.15,
            timeout_s: POSITIONING_TIMEOUT_S,
        }
    }
}

impl PositioningConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_s)
    }
}

impl Validate for PositioningConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("positioning.target_distance_m", self.target_distance_m)?;
        non_negative("positioning.tolerance_m", self.tolerance_m)?;
        in_range("positioning.speed", self.speed, 0.0, OUTPUT_LIMIT)?;
        positive("positioning.timeout_s", self.timeout_s)
    }
}

// ─── Single-Axis Actuators ──────────────────────────────────────────

/// How a single-axis actuator is driven while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorControl {
    /// Closed-loop velocity setpoint in the motor controller.
    #[default]
    Velocity,
    /// Open-loop output fraction.
    OpenLoop,
}

/// Feeder / intake actuator tuning.
///
/// Inside [`RobotConfig`] a partial `[feeder]` or `[intake]` table fills its
/// missing fields from [`ActuatorConfig::feeder`] or
/// [`ActuatorConfig::intake`] respectively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub control: ActuatorControl,
    /// Run velocity [rotations/s] in `Velocity` mode.
    pub velocity_rps: f64,
    /// Run output in `OpenLoop` mode.
    pub open_loop_output: f64,
    /// Velocity setpoints are clamped to ±this value.
    pub max_velocity_rps: f64,
    /// Rotation target for the finite run primitive.
    pub run_rotations: f64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self::feeder()
    }
}

impl ActuatorConfig {
    /// Defaults for the feeder wheel.
    pub fn feeder() -> Self {
        Self {
            control: ActuatorControl::Velocity,
            velocity_rps: -28.0,
            open_loop_output: -0.11,
            max_velocity_rps: 100.0,
            run_rotations: 2.0,
        }
    }

    /// Defaults for the intake roller.
    pub fn intake() -> Self {
        Self {
            control: ActuatorControl::Velocity,
            velocity_rps: 20.0,
            open_loop_output: 0.5,
            max_velocity_rps: 100.0,
            run_rotations: 5.0,
        }
    }

    fn validate_named(&self, section: &str) -> Result<(), ConfigError> {
        positive(&format!("{section}.max_velocity_rps"), self.max_velocity_rps)?;
        in_range(
            &format!("{section}.velocity_rps"),
            self.velocity_rps,
            -self.max_velocity_rps,
            self.max_velocity_rps,
        )?;
        in_range(
            &format!("{section}.open_loop_output"),
            self.open_loop_output,
            -OUTPUT_LIMIT,
            OUTPUT_LIMIT,
        )?;
        non_negative(&format!("{section}.run_rotations"), self.run_rotations)
    }
}

/// An `ActuatorConfig` table as written in the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActuatorTable {
    control: Option<ActuatorControl>,
    velocity_rps: Option<f64>,
    open_loop_output: Option<f64>,
    max_velocity_rps: Option<f64>,
    run_rotations: Option<f64>,
}

impl ActuatorTable {
    fn over(self, base: ActuatorConfig) -> ActuatorConfig {
        ActuatorConfig {
            control: self.control.unwrap_or(base.control),
            velocity_rps: self.velocity_rps.unwrap_or(base.velocity_rps),
            open_loop_output: self.open_loop_output.unwrap_or(base.open_loop_output),
            max_velocity_rps: self.max_velocity_rps.unwrap_or(base.max_velocity_rps),
            run_rotations: self.run_rotations.unwrap_or(base.run_rotations),
        }
    }
}

fn feeder_section<'de, D: Deserializer<'de>>(d: D) -> Result<ActuatorConfig, D::Error> {
    ActuatorTable::deserialize(d).map(|t| t.over(ActuatorConfig::feeder()))
}

fn intake_section<'de, D: Deserializer<'de>>(d: D) -> Result<ActuatorConfig, D::Error> {
    ActuatorTable::deserialize(d).map(|t| t.over(ActuatorConfig::intake()))
}

// ─── Timeouts ───────────────────────────────────────────────────────

/// Iteration backstops for encoder-bounded primitives [ticks].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub drive_forward_ticks: u32,
    pub turn_ticks: u32,
    pub actuator_run_ticks: u32,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            drive_forward_ticks: DRIVE_FORWARD_TIMEOUT_TICKS,
            turn_ticks: TURN_TIMEOUT_TICKS,
            actuator_run_ticks: ACTUATOR_RUN_TIMEOUT_TICKS,
        }
    }
}

impl Validate for TimeoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, ticks) in [
            ("timeouts.drive_forward_ticks", self.drive_forward_ticks),
            ("timeouts.turn_ticks", self.turn_ticks),
            ("timeouts.actuator_run_ticks", self.actuator_run_ticks),
        ] {
            if ticks == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

// ─── Validation Helpers ─────────────────────────────────────────────

fn finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn in_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < min || value > max {
        return Err(ConfigError::ValidationError(format!(
            "{name} {value} out of range [{min}, {max}]"
        )));
    }
    Ok(())
}
