//! Encoder-bounded primitives driven tick by tick.

use std::f64::consts::PI;

use rover_common::hal::driver::ActuatorSink;
use rover_common::hal::types::ActuatorId;
use rover_common::robot::RobotConfig;
use rover_common::robot::config::{ActuatorConfig, DriveConfig, RoutineKind};
use rover_control::command::lifecycle::Command;
use rover_control::command::scheduler::CommandScheduler;
use rover_control::cycle::{CycleRunner, RobotMode};
use rover_control::primitive::actuator::ActuatorRun;
use rover_control::primitive::drive_forward::DriveForward;
use rover_control::primitive::turn::Turn;
use rover_control::sim::{SimConfig, SimRobot};
use rover_control::subsystem::drivetrain::Drivetrain;
use rover_control::subsystem::roller::Roller;
use std::time::Duration;

const PERIOD: Duration = Duration::from_millis(20);

/// One metre of travel per motor rotation, 0.6 m track.
fn unit_drivetrain() -> Drivetrain {
    Drivetrain::new(&DriveConfig {
        wheel_diameter_m: 1.0 / PI,
        gear_ratio: 1.0,
        track_width_m: 0.6,
        ..DriveConfig::default()
    })
}

/// Execute + evaluate like one scheduler tick, then advance physics.
fn tick(cmd: &mut dyn Command, sim: &mut SimRobot) -> bool {
    cmd.execute(sim).unwrap();
    let done = cmd.is_finished(sim).unwrap();
    sim.advance(PERIOD);
    done
}

#[test]
fn turn_ninety_degrees_on_point_six_metre_track() {
    let mut sim = SimRobot::default();
    let mut turn = Turn::new(unit_drivetrain(), 90.0, 0.4, 300).unwrap();
    turn.initialize(&mut sim).unwrap();

    turn.execute(&mut sim).unwrap();
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.4);
    assert_eq!(sim.output(ActuatorId::DriveRight), -0.4);

    // ΔL − ΔR = 0.6 m → 57.3°
    sim.set_position(ActuatorId::DriveLeft, 0.3);
    sim.set_position(ActuatorId::DriveRight, -0.3);
    assert!(!turn.is_finished(&sim).unwrap());

    // ΔL − ΔR = 0.952 m → 90.9°
    sim.set_position(ActuatorId::DriveLeft, 0.476);
    sim.set_position(ActuatorId::DriveRight, -0.476);
    assert!(turn.is_finished(&sim).unwrap());

    turn.end(&mut sim, false).unwrap();
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
    assert_eq!(sim.output(ActuatorId::DriveRight), 0.0);
}

#[test]
fn turn_with_zero_track_width_reports_geometry_error() {
    let mut sim = SimRobot::default();
    let drivetrain = Drivetrain::new(&DriveConfig {
        track_width_m: 0.0,
        ..DriveConfig::default()
    });
    let mut turn = Turn::new(drivetrain, 45.0, 0.4, 300).unwrap();
    assert!(turn.initialize(&mut sim).is_err());
    assert!(turn.execute(&mut sim).is_err());
    assert!(turn.is_finished(&sim).is_err());
    assert_eq!(sim.writes(ActuatorId::DriveLeft), 0);
    assert_eq!(sim.writes(ActuatorId::DriveRight), 0);
}

#[test]
fn scheduled_turn_with_zero_track_width_never_moves() {
    let mut sim = SimRobot::default();
    let drivetrain = Drivetrain::new(&DriveConfig {
        track_width_m: 0.0,
        ..DriveConfig::default()
    });
    let mut scheduler = CommandScheduler::new();
    scheduler
        .schedule(Box::new(Turn::new(drivetrain, 90.0, 0.4, 300).unwrap()))
        .unwrap();

    let report = scheduler.tick(&mut sim);
    assert_eq!(report.errored, 1);
    assert_eq!(report.active, 0);
    // Only the stop from `end(true)` reaches the motors.
    assert_eq!(sim.writes(ActuatorId::DriveLeft), 1);
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
    assert_eq!(sim.output(ActuatorId::DriveRight), 0.0);
}

#[test]
fn drive_forward_stops_within_one_tick_of_target() {
    let config = DriveConfig::default();
    let mut sim = SimRobot::new(SimConfig::from_drive(&config));
    let drivetrain = Drivetrain::new(&config);
    let mut cmd = DriveForward::new(drivetrain, 0.5, 0.5, 200).unwrap();
    cmd.initialize(&mut sim).unwrap();

    let ticks = (1..=200).find(|_| tick(&mut cmd, &mut sim)).unwrap();
    cmd.end(&mut sim, false).unwrap();

    // 0.5 output × 50 rps × 0.02 s per tick
    let per_tick = 0.5 * 50.0 * 0.02 * config.meters_per_rotation();
    let travelled = drivetrain.average_meters(&sim).unwrap();
    assert!(ticks < 200, "timed out");
    assert!(travelled >= 0.5);
    assert!(travelled < 0.5 + 2.0 * per_tick, "overshoot {travelled}");
    assert_eq!(sim.output(ActuatorId::DriveLeft), 0.0);
}

#[test]
fn actuator_run_two_rotations() {
    let mut sim = SimRobot::default();
    let roller = Roller::new(ActuatorId::Feeder, ActuatorConfig::feeder(), 1.0);
    let mut cmd = ActuatorRun::new(roller, 2.0, 200).unwrap();
    cmd.initialize(&mut sim).unwrap();

    // −28 rps × 0.02 s = 0.56 rotations per tick; finished on the fifth
    // evaluation (after four ticks of travel).
    let ticks = (1..=200).find(|_| tick(&mut cmd, &mut sim)).unwrap();
    assert_eq!(ticks, 5);
    assert!(sim.position(ActuatorId::Feeder).unwrap() <= -2.0);
}

#[test]
fn actuator_run_stalled_hits_two_hundred_tick_backstop() {
    let mut sim = SimRobot::default();
    let roller = Roller::new(ActuatorId::Feeder, ActuatorConfig::feeder(), 1.0);
    let mut cmd = ActuatorRun::new(roller, 2.0, 200).unwrap();
    cmd.initialize(&mut sim).unwrap();

    let ticks = (1..=400)
        .find(|_| {
            cmd.execute(&mut sim).unwrap();
            // Encoder never moves: the roller is jammed.
            sim.set_position(ActuatorId::Feeder, 0.0);
            cmd.is_finished(&sim).unwrap()
        })
        .unwrap();
    assert_eq!(ticks, 200);
}

#[test]
fn drive_and_turn_routine_runs_to_completion() {
    let mut config = RobotConfig::default();
    config.auto.routine = RoutineKind::DriveAndTurn;
    let drivetrain = Drivetrain::new(&config.drive);
    let track = config.drive.track_width_m;
    let mut runner = CycleRunner::new(config, SimRobot::default()).unwrap();
    runner.set_mode(RobotMode::Autonomous).unwrap();

    let done = (1..=300).find(|_| {
        runner.step();
        runner.hardware_mut().advance(PERIOD);
        runner.routine_finished()
    });
    assert!(done.is_some(), "routine did not finish");
    assert_eq!(runner.stats().errored, 0);

    let sim = runner.hardware();
    let left = drivetrain.left_meters(sim).unwrap();
    let right = drivetrain.right_meters(sim).unwrap();
    let heading = ((left - right) / track).to_degrees();
    assert!((90.0..100.0).contains(&heading), "heading {heading}");
    assert!((left + right) / 2.0 >= 0.5);
}
