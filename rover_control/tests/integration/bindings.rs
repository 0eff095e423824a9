//! Operator bindings through the cycle runner in teleop.

use std::time::Duration;

use rover_common::hal::types::ActuatorId;
use rover_common::robot::RobotConfig;
use rover_control::cycle::{CycleRunner, RobotMode};
use rover_control::sim::SimRobot;

const PERIOD: Duration = Duration::from_millis(20);

fn teleop() -> CycleRunner<SimRobot> {
    let mut runner = CycleRunner::new(RobotConfig::default(), SimRobot::default()).unwrap();
    runner.set_mode(RobotMode::Teleop).unwrap();
    runner.step();
    runner
}

fn cycle(runner: &mut CycleRunner<SimRobot>) {
    runner.step();
    runner.hardware_mut().advance(PERIOD);
}

fn press(runner: &mut CycleRunner<SimRobot>, button: usize, pressed: bool) {
    runner.hardware_mut().set_button(button, pressed);
    cycle(runner);
}

#[test]
fn align_runs_only_while_held() {
    let mut runner = teleop();
    let button = runner.config().operator.align_button;
    runner.hardware_mut().set_wall_distance(0.8);

    press(&mut runner, button, true);
    assert_eq!(
        runner.holder_name(ActuatorId::DriveLeft),
        Some("AlignWithSensors")
    );
    cycle(&mut runner);
    assert_eq!(
        runner.holder_name(ActuatorId::DriveRight),
        Some("AlignWithSensors")
    );

    press(&mut runner, button, false);
    assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("ArcadeDrive"));
    assert_eq!(runner.hardware().output(ActuatorId::DriveLeft), 0.0);
    assert_eq!(runner.stats().interrupted, 1);
}

#[test]
fn feeder_toggles_on_successive_presses() {
    let mut runner = teleop();
    let button = runner.config().operator.feeder_button;

    press(&mut runner, button, true);
    assert_eq!(runner.holder_name(ActuatorId::Feeder), Some("ActuatorHold"));
    assert_eq!(
        runner.hardware().velocity_setpoint(ActuatorId::Feeder),
        Some(-28.0)
    );

    press(&mut runner, button, false);
    cycle(&mut runner);
    assert_eq!(runner.holder_name(ActuatorId::Feeder), Some("ActuatorHold"));

    press(&mut runner, button, true);
    assert_eq!(runner.holder_name(ActuatorId::Feeder), Some("ActuatorIdle"));
    assert_eq!(runner.hardware().output(ActuatorId::Feeder), 0.0);
    assert_eq!(runner.hardware().velocity_setpoint(ActuatorId::Feeder), None);
}

#[test]
fn position_press_runs_to_completion_after_release() {
    let mut runner = teleop();
    let button = runner.config().operator.position_button;

    press(&mut runner, button, true);
    press(&mut runner, button, false);
    assert_eq!(
        runner.holder_name(ActuatorId::DriveLeft),
        Some("DriveToTargetDistance")
    );

    let back_to_arcade = (1..=250).find(|_| {
        cycle(&mut runner);
        runner.holder_name(ActuatorId::DriveLeft) == Some("ArcadeDrive")
    });
    assert!(back_to_arcade.is_some());
    assert_eq!(runner.stats().interrupted, 1);
}

#[test]
fn binding_preempts_autonomous_routine() {
    let mut runner = CycleRunner::new(RobotConfig::default(), SimRobot::default()).unwrap();
    runner.set_mode(RobotMode::Autonomous).unwrap();
    cycle(&mut runner);
    assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("DriveForward"));

    let button = runner.config().operator.align_button;
    press(&mut runner, button, true);
    assert!(runner.routine_finished());
    assert_eq!(
        runner.holder_name(ActuatorId::DriveLeft),
        Some("AlignWithSensors")
    );
}

#[test]
fn hardware_failure_terminates_command_only() {
    let mut runner = teleop();
    let button = runner.config().operator.intake_button;
    runner.hardware_mut().fail_actuator(ActuatorId::Intake, true);

    press(&mut runner, button, true);
    assert!(runner.stats().errored >= 1);
    assert_ne!(runner.holder_name(ActuatorId::Intake), Some("ActuatorHold"));

    runner.hardware_mut().set_axis(1, -1.0);
    cycle(&mut runner);
    assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("ArcadeDrive"));
    assert!(runner.hardware().output(ActuatorId::DriveLeft) > 0.0);
}
