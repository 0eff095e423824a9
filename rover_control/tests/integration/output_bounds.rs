//! Every value written to an actuator stays inside the safe range.

use rover_common::hal::types::{ActuatorId, SensorId};
use rover_common::robot::RobotConfig;
use rover_common::robot::config::{AlignmentConfig, DriveConfig, PidGains, RoutineKind};
use rover_control::command::lifecycle::Command;
use rover_control::primitive::align::AlignWithSensors;
use rover_control::primitive::arcade::ArcadeDrive;
use rover_control::primitive::drive_forward::DriveForward;
use rover_control::primitive::turn::Turn;
use rover_control::routine::build_routine;
use rover_control::sim::SimRobot;
use rover_control::subsystem::drivetrain::Drivetrain;

const AXIS_SAMPLES: [f64; 9] = [-1.0, -0.7, -0.3, -0.05, 0.0, 0.2, 0.6, 1.0, f64::NAN];

fn assert_drive_bounded(sim: &SimRobot) {
    for id in [ActuatorId::DriveLeft, ActuatorId::DriveRight] {
        let out = sim.output(id);
        assert!(out.is_finite() && (-1.0..=1.0).contains(&out), "{id} = {out}");
    }
}

#[test]
fn arcade_output_bounded_over_stick_range() {
    for (max_speed, sensitivity) in [(0.7, 0.5), (1.0, 1.0)] {
        let mut config = RobotConfig::default();
        config.drive.max_speed_fraction = max_speed;
        config.drive.turn_sensitivity = sensitivity;
        let mut cmd = ArcadeDrive::from_config(&config);
        let mut sim = SimRobot::default();

        for speed in AXIS_SAMPLES {
            for turn in AXIS_SAMPLES {
                sim.set_axis(config.operator.speed_axis, speed);
                sim.set_axis(config.operator.turn_axis, turn);
                cmd.execute(&mut sim).unwrap();
                assert_drive_bounded(&sim);
            }
        }
    }
}

#[test]
fn alignment_output_bounded_for_extreme_readings() {
    let config = AlignmentConfig {
        alignment: PidGains {
            max_output: 0.8,
            ..AlignmentConfig::default().alignment
        },
        distance: PidGains {
            max_output: 0.8,
            ..AlignmentConfig::default().distance
        },
        ..AlignmentConfig::default()
    };
    let mut cmd = AlignWithSensors::new(Drivetrain::new(&DriveConfig::default()), &config, 0.02);
    let mut sim = SimRobot::default();
    cmd.initialize(&mut sim).unwrap();

    for (left, right) in [(1e6, 0.0), (0.0, 1e6), (1e6, 1e6), (0.0, 0.0), (3.0, 0.1)] {
        sim.set_sensor_distance(SensorId::RangeLeft, left);
        sim.set_sensor_distance(SensorId::RangeRight, right);
        cmd.execute(&mut sim).unwrap();
        assert_drive_bounded(&sim);
    }
}

#[test]
fn zero_and_trivial_targets_command_no_motion() {
    let drivetrain = Drivetrain::new(&DriveConfig::default());
    let mut sim = SimRobot::default();

    let mut drive = DriveForward::new(drivetrain, 0.0, 0.8, 200).unwrap();
    drive.initialize(&mut sim).unwrap();
    drive.execute(&mut sim).unwrap();
    assert!(drive.is_finished(&sim).unwrap());
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);

    let mut turn = Turn::new(drivetrain, 0.05, 0.8, 300).unwrap();
    turn.initialize(&mut sim).unwrap();
    turn.execute(&mut sim).unwrap();
    assert!(turn.is_finished(&sim).unwrap());
    assert_eq!(sim.output(ActuatorId::DriveRight), 0.0);
}

#[test]
fn rejected_construction_touches_no_actuator() {
    let drivetrain = Drivetrain::new(&DriveConfig::default());
    let sim = SimRobot::default();

    assert!(DriveForward::new(drivetrain, f64::NAN, 0.5, 200).is_err());
    assert!(Turn::new(drivetrain, f64::INFINITY, 0.5, 300).is_err());

    let mut config = RobotConfig::default();
    config.auto.turn_degrees = f64::NAN;
    assert!(build_routine(config.auto.routine, &config).is_ok());
    assert!(build_routine(RoutineKind::Turn, &config).is_err());

    for id in ActuatorId::ALL {
        assert_eq!(sim.writes(id), 0);
    }
}
