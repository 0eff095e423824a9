//! Robot configuration files feeding the runner.

use std::io::Write;
use std::path::Path;

use rover_common::config::{ConfigError, ConfigLoader};
use rover_common::hal::types::ActuatorId;
use rover_common::robot::RobotConfig;
use rover_common::robot::config::{ActuatorConfig, ActuatorControl, RoutineKind};
use rover_control::cycle::{CycleError, CycleRunner, RobotMode};
use rover_control::sim::SimRobot;
use tempfile::NamedTempFile;

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/rover.toml");
    let config = RobotConfig::load_validated(&path).unwrap();
    assert_eq!(config, RobotConfig::default());
}

#[test]
fn partial_file_keeps_defaults() {
    let file = write_config(
        r#"
[auto]
routine = "position_and_feed"

[intake]
control = "open_loop"
open_loop_output = 0.6
"#,
    );
    let config = RobotConfig::load_validated(file.path()).unwrap();

    assert_eq!(config.auto.routine, RoutineKind::PositionAndFeed);
    assert_eq!(config.auto.drive_speed, 0.5);
    assert_eq!(config.intake.control, ActuatorControl::OpenLoop);
    assert_eq!(config.intake.open_loop_output, 0.6);
    assert_eq!(config.intake.velocity_rps, ActuatorConfig::intake().velocity_rps);
    assert_eq!(config.intake.run_rotations, ActuatorConfig::intake().run_rotations);
    assert_eq!(config.feeder, ActuatorConfig::feeder());
}

#[test]
fn duplicate_buttons_are_rejected() {
    let file = write_config(
        r#"
[operator]
align_button = 6
"#,
    );
    let result = RobotConfig::load_validated(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let file = write_config("[drive\nwheel_diameter_m = ");
    assert!(matches!(
        RobotConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn missing_file_is_reported() {
    let result = RobotConfig::load(Path::new("/nonexistent/rover.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn loaded_routine_drives_autonomous_entry() {
    let file = write_config(
        r#"
[auto]
routine = "turn"
turn_degrees = -45.0
"#,
    );
    let config = RobotConfig::load_validated(file.path()).unwrap();
    let mut runner = CycleRunner::new(config, SimRobot::default()).unwrap();
    runner.set_mode(RobotMode::Autonomous).unwrap();
    runner.step();

    let sim = runner.hardware();
    assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("Turn"));
    assert!(sim.output(ActuatorId::DriveLeft) < 0.0);
    assert!(sim.output(ActuatorId::DriveRight) > 0.0);
}

#[test]
fn runner_rejects_invalid_config() {
    let mut config = RobotConfig::default();
    config.drive.gear_ratio = 0.0;
    assert!(matches!(
        CycleRunner::new(config, SimRobot::default()),
        Err(CycleError::Config(ConfigError::ValidationError(_)))
    ));
}
