//! In-process simulation backend.
//!
//! `SimRobot` implements every hardware trait so the scheduler, the
//! primitives and the binary can run without a robot. Physics is first
//! order and deterministic:
//!
//! - Encoder rate is the velocity setpoint when one is active, otherwise
//!   `output × free_speed_rps`.
//! - Each range sensor tracks its own drive side. A front-mounted sensor
//!   closes on the target when that side drives forward; a rear-mounted one
//!   opens.
//! - Time only moves in [`SimRobot::advance`].

use std::time::Duration;

use rover_common::consts::{INVALID_DISTANCE, MAX_OPERATOR_AXES, MAX_OPERATOR_BUTTONS};
use rover_common::hal::driver::{ActuatorSink, Clock, HalError, OperatorInput, SensorSource};
use rover_common::hal::types::{ActuatorId, SensorId};
use rover_common::robot::config::DriveConfig;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Side of the chassis the range pair looks out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorMount {
    #[default]
    Front,
    Rear,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Encoder rate at full open-loop output [rotations/s].
    pub free_speed_rps: f64,
    /// Wheel travel per motor rotation [m].
    pub meters_per_rotation: f64,
    pub mount: SensorMount,
    /// Starting distance seen by both sensors [m].
    pub wall_distance_m: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_drive(&DriveConfig::default())
    }
}

impl SimConfig {
    pub fn from_drive(drive: &DriveConfig) -> Self {
        Self {
            free_speed_rps: 50.0,
            meters_per_rotation: drive.meters_per_rotation(),
            mount: SensorMount::Front,
            wall_distance_m: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SimActuator {
    output: f64,
    velocity: Option<f64>,
    position: f64,
    writes: u64,
    failed: bool,
}

impl SimActuator {
    /// Encoder rate [rotations/s].
    fn rate(&self, free_speed_rps: f64) -> f64 {
        self.velocity.unwrap_or(self.output * free_speed_rps)
    }
}

#[derive(Debug, Clone, Copy)]
struct SimSensor {
    distance: f64,
    faulted: bool,
}

/// Deterministic two-wheel robot with two rollers and a range pair.
#[derive(Debug, Clone)]
pub struct SimRobot {
    config: SimConfig,
    actuators: [SimActuator; ActuatorId::COUNT],
    sensors: [SimSensor; SensorId::COUNT],
    axes: [f64; MAX_OPERATOR_AXES],
    buttons: [bool; MAX_OPERATOR_BUTTONS],
    elapsed: Duration,
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimRobot {
    pub fn new(config: SimConfig) -> Self {
        let sensor = SimSensor {
            distance: config.wall_distance_m,
            faulted: false,
        };
        Self {
            config,
            actuators: [SimActuator::default(); ActuatorId::COUNT],
            sensors: [sensor; SensorId::COUNT],
            axes: [0.0; MAX_OPERATOR_AXES],
            buttons: [false; MAX_OPERATOR_BUTTONS],
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ─── Physics ────────────────────────────────────────────────────

    /// Integrate encoders and sensor distances over `dt`, then move the clock.
    pub fn advance(&mut self, dt: Duration) {
        let dt_s = dt.as_secs_f64();
        let free = self.config.free_speed_rps;

        for actuator in &mut self.actuators {
            actuator.position += actuator.rate(free) * dt_s;
        }

        let sign = match self.config.mount {
            SensorMount::Front => -1.0,
            SensorMount::Rear => 1.0,
        };
        for (sensor, side) in [
            (SensorId::RangeLeft, ActuatorId::DriveLeft),
            (SensorId::RangeRight, ActuatorId::DriveRight),
        ] {
            let travel =
                self.actuators[side.index()].rate(free) * dt_s * self.config.meters_per_rotation;
            let state = &mut self.sensors[sensor.index()];
            if state.distance >= 0.0 {
                state.distance = (state.distance + sign * travel).max(0.0);
            }
        }

        self.elapsed += dt;
        trace!(
            elapsed_ms = self.elapsed.as_millis() as u64,
            left = self.sensors[SensorId::RangeLeft.index()].distance,
            right = self.sensors[SensorId::RangeRight.index()].distance,
            "sim advanced"
        );
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Last open-loop output written (0 while a velocity setpoint is active).
    #[inline]
    pub fn output(&self, id: ActuatorId) -> f64 {
        self.actuators[id.index()].output
    }

    /// Active velocity setpoint; cleared by any open-loop write.
    #[inline]
    pub fn velocity_setpoint(&self, id: ActuatorId) -> Option<f64> {
        self.actuators[id.index()].velocity
    }

    /// Successful writes (output or velocity) since construction.
    #[inline]
    pub fn writes(&self, id: ActuatorId) -> u64 {
        self.actuators[id.index()].writes
    }

    /// True distance, ignoring faults.
    #[inline]
    pub fn sensor_distance(&self, id: SensorId) -> f64 {
        self.sensors[id.index()].distance
    }

    // ─── Stimulus ───────────────────────────────────────────────────

    pub fn set_position(&mut self, id: ActuatorId, rotations: f64) {
        self.actuators[id.index()].position = rotations;
    }

    /// Put both sensors at `meters` from the target.
    pub fn set_wall_distance(&mut self, meters: f64) {
        for sensor in &mut self.sensors {
            sensor.distance = meters;
        }
    }

    pub fn set_sensor_distance(&mut self, id: SensorId, meters: f64) {
        self.sensors[id.index()].distance = meters;
    }

    /// A faulted sensor reads the invalid sentinel until cleared.
    pub fn set_sensor_fault(&mut self, id: SensorId, faulted: bool) {
        self.sensors[id.index()].faulted = faulted;
    }

    /// Make every write to `id` fail with `HalError::Unavailable`.
    pub fn fail_actuator(&mut self, id: ActuatorId, failed: bool) {
        self.actuators[id.index()].failed = failed;
    }

    /// Out-of-range axes are ignored.
    pub fn set_axis(&mut self, index: usize, value: f64) {
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = value.clamp(-1.0, 1.0);
        }
    }

    pub fn set_button(&mut self, index: usize, pressed: bool) {
        if let Some(button) = self.buttons.get_mut(index) {
            *button = pressed;
        }
    }

    fn writable(&mut self, id: ActuatorId) -> Result<&mut SimActuator, HalError> {
        let actuator = &mut self.actuators[id.index()];
        if actuator.failed {
            return Err(HalError::Unavailable(id));
        }
        actuator.writes += 1;
        Ok(actuator)
    }
}

// ─── Hardware traits ────────────────────────────────────────────────

impl ActuatorSink for SimRobot {
    fn set_output(&mut self, id: ActuatorId, value: f64) -> Result<(), HalError> {
        let actuator = self.writable(id)?;
        actuator.output = value;
        actuator.velocity = None;
        Ok(())
    }

    fn set_velocity(&mut self, id: ActuatorId, rps: f64) -> Result<(), HalError> {
        let actuator = self.writable(id)?;
        actuator.output = 0.0;
        actuator.velocity = Some(rps);
        Ok(())
    }

    fn position(&self, id: ActuatorId) -> Result<f64, HalError> {
        Ok(self.actuators[id.index()].position)
    }

    fn reset_position(&mut self, id: ActuatorId) -> Result<(), HalError> {
        self.actuators[id.index()].position = 0.0;
        Ok(())
    }
}

impl SensorSource for SimRobot {
    fn distance(&self, id: SensorId) -> f64 {
        let sensor = &self.sensors[id.index()];
        if sensor.faulted {
            INVALID_DISTANCE
        } else {
            sensor.distance
        }
    }
}

impl OperatorInput for SimRobot {
    fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}

impl Clock for SimRobot {
    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
