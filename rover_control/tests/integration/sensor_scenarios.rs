//! Range-sensor primitives closing the loop through the simulator.

use std::time::Duration;

use rover_common::hal::driver::SensorSource;
use rover_common::hal::types::{ActuatorId, SensorId};
use rover_common::robot::config::{AlignmentConfig, DriveConfig, PositioningConfig};
use rover_control::command::lifecycle::Command;
use rover_control::primitive::align::AlignWithSensors;
use rover_control::primitive::positioning::DriveToTargetDistance;
use rover_control::sim::{SensorMount, SimConfig, SimRobot};
use rover_control::subsystem::drivetrain::Drivetrain;

const PERIOD: Duration = Duration::from_millis(20);

fn sim(mount: SensorMount) -> SimRobot {
    SimRobot::new(SimConfig {
        mount,
        ..SimConfig::from_drive(&DriveConfig::default())
    })
}

fn align() -> AlignWithSensors {
    AlignWithSensors::new(
        Drivetrain::new(&DriveConfig::default()),
        &AlignmentConfig::default(),
        PERIOD.as_secs_f64(),
    )
}

#[test]
fn alignment_settles_square_at_target() {
    let mut sim = sim(SensorMount::Rear);
    sim.set_sensor_distance(SensorId::RangeLeft, 0.8);
    sim.set_sensor_distance(SensorId::RangeRight, 0.7);

    let mut cmd = align();
    cmd.initialize(&mut sim).unwrap();
    let settled = (1..=300).find(|_| {
        cmd.execute(&mut sim).unwrap();
        assert!(!cmd.is_finished(&sim).unwrap());
        sim.advance(PERIOD);
        cmd.at_setpoint()
    });
    assert!(settled.is_some(), "alignment did not settle");
    assert!(cmd.alignment_at_setpoint());
    assert!(cmd.distance_at_setpoint());

    let left = sim.distance(SensorId::RangeLeft);
    let right = sim.distance(SensorId::RangeRight);
    assert!((left - right).abs() < 0.02, "skew {left} vs {right}");
    assert!(((left + right) / 2.0 - 0.5).abs() < 0.03);

    cmd.end(&mut sim, true).unwrap();
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
    assert_eq!(sim.output(ActuatorId::DriveRight), 0.0);
}

#[test]
fn alignment_holds_through_sensor_dropout() {
    let mut sim = sim(SensorMount::Rear);
    sim.set_wall_distance(0.9);
    let mut cmd = align();
    cmd.initialize(&mut sim).unwrap();

    for _ in 0..5 {
        cmd.execute(&mut sim).unwrap();
        sim.advance(PERIOD);
    }
    assert_ne!(sim.output(ActuatorId::DriveLeft), 0.0);

    sim.set_sensor_fault(SensorId::RangeLeft, true);
    let before = sim.sensor_distance(SensorId::RangeRight);
    for _ in 0..10 {
        cmd.execute(&mut sim).unwrap();
        assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
        assert_eq!(sim.output(ActuatorId::DriveRight), 0.0);
        sim.advance(PERIOD);
    }
    assert_eq!(sim.sensor_distance(SensorId::RangeRight), before);

    sim.set_sensor_fault(SensorId::RangeLeft, false);
    cmd.execute(&mut sim).unwrap();
    assert!(sim.output(ActuatorId::DriveLeft) < 0.0);
}

#[test]
fn positioning_approaches_and_finishes_in_window() {
    let mut sim = sim(SensorMount::Front);
    sim.set_wall_distance(1.0);

    let mut cmd = DriveToTargetDistance::new(
        Drivetrain::new(&DriveConfig::default()),
        &PositioningConfig::default(),
    )
    .unwrap();
    cmd.initialize(&mut sim).unwrap();

    let finished = (1..=250).find(|_| {
        cmd.execute(&mut sim).unwrap();
        let done = cmd.is_finished(&sim).unwrap();
        sim.advance(PERIOD);
        done
    });
    // 0.5 m at 0.15 × 50 rps × 0.0532 m/rot ≈ 0.4 m/s, well inside 5 s.
    let ticks = finished.unwrap();
    assert!(ticks < 100, "took {ticks} ticks");

    cmd.end(&mut sim, false).unwrap();
    for id in [SensorId::RangeLeft, SensorId::RangeRight] {
        assert!((sim.distance(id) - 0.5).abs() <= 0.02);
    }
}

#[test]
fn positioning_times_out_without_readings() {
    let mut sim = sim(SensorMount::Front);
    sim.set_sensor_fault(SensorId::RangeRight, true);

    let mut cmd = DriveToTargetDistance::new(
        Drivetrain::new(&DriveConfig::default()),
        &PositioningConfig {
            timeout_s: 1.0,
            ..PositioningConfig::default()
        },
    )
    .unwrap();
    cmd.initialize(&mut sim).unwrap();

    let finished = (1..=100).find(|_| {
        cmd.execute(&mut sim).unwrap();
        assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
        let done = cmd.is_finished(&sim).unwrap();
        sim.advance(PERIOD);
        done
    });
    // Deadline passes after 50 periods; checked on the 51st evaluation.
    assert_eq!(finished, Some(51));
}
