//! Robot wiring: default commands, operator bindings and autonomous
//! routines built from a [`RobotConfig`].
//!
//! | Handle | Default | Binding |
//! |--------|---------|---------|
//! | drivetrain | `ArcadeDrive` | align (while held), position (on press) |
//! | feeder | `ActuatorIdle` | `ActuatorHold` (toggle) |
//! | intake | `ActuatorIdle` | `ActuatorHold` (while held) |
//!
//! Every factory clones a prototype built here, so parameter errors
//! surface once at wiring time instead of inside a tick.

use std::time::Duration;

use rover_common::hal::types::{ActuatorId, Requirements};
use rover_common::robot::RobotConfig;
use rover_common::robot::config::RoutineKind;
use tracing::info;

use crate::command::binding::BindingKind;
use crate::command::group::{Sequence, Wait};
use crate::command::lifecycle::{Command, CommandFactory};
use crate::command::scheduler::CommandScheduler;
use crate::error::{CommandError, SetupError};
use crate::primitive::actuator::{ActuatorHold, ActuatorIdle, ActuatorRun};
use crate::primitive::align::AlignWithSensors;
use crate::primitive::arcade::ArcadeDrive;
use crate::primitive::drive_forward::DriveForward;
use crate::primitive::positioning::DriveToTargetDistance;
use crate::primitive::turn::Turn;
use crate::subsystem::drivetrain::Drivetrain;
use crate::subsystem::roller::Roller;

/// Factory that hands out clones of `prototype`.
fn factory<C>(prototype: C) -> CommandFactory
where
    C: Command + Clone + 'static,
{
    Box::new(move || Box::new(prototype.clone()) as Box<dyn Command>)
}

pub fn feeder(config: &RobotConfig) -> Roller {
    Roller::new(ActuatorId::Feeder, config.feeder, config.drive.output_limit)
}

pub fn intake(config: &RobotConfig) -> Roller {
    Roller::new(ActuatorId::Intake, config.intake, config.drive.output_limit)
}

/// Register both defaults and bindings.
pub fn configure(
    scheduler: &mut CommandScheduler,
    config: &RobotConfig,
) -> Result<(), SetupError> {
    register_defaults(scheduler, config)?;
    register_bindings(scheduler, config)?;
    Ok(())
}

/// Arcade drive on the drivetrain, idle on each roller.
pub fn register_defaults(
    scheduler: &mut CommandScheduler,
    config: &RobotConfig,
) -> Result<(), SetupError> {
    scheduler.set_default_command(
        Requirements::DRIVETRAIN,
        factory(ArcadeDrive::from_config(config)),
    )?;
    for roller in [feeder(config), intake(config)] {
        scheduler.set_default_command(
            roller.id().requirement(),
            factory(ActuatorIdle::new(roller)),
        )?;
    }
    Ok(())
}

pub fn register_bindings(
    scheduler: &mut CommandScheduler,
    config: &RobotConfig,
) -> Result<(), SetupError> {
    let operator = &config.operator;
    let drivetrain = Drivetrain::new(&config.drive);

    scheduler.bind(
        operator.intake_button,
        BindingKind::WhileHeld,
        factory(ActuatorHold::new(intake(config))),
    )?;
    scheduler.bind(
        operator.feeder_button,
        BindingKind::Toggle,
        factory(ActuatorHold::new(feeder(config))),
    )?;
    scheduler.bind(
        operator.align_button,
        BindingKind::WhileHeld,
        factory(AlignWithSensors::new(
            drivetrain,
            &config.alignment,
            config.cycle.period_s(),
        )),
    )?;
    scheduler.bind(
        operator.position_button,
        BindingKind::OnPress,
        factory(DriveToTargetDistance::new(drivetrain, &config.positioning)?),
    )?;

    info!(
        intake = operator.intake_button,
        feeder = operator.feeder_button,
        align = operator.align_button,
        position = operator.position_button,
        "operator bindings registered"
    );
    Ok(())
}

// ─── Autonomous ─────────────────────────────────────────────────────

fn settle(config: &RobotConfig) -> Result<Wait, CommandError> {
    let seconds = config.auto.settle_delay_s;
    Duration::try_from_secs_f64(seconds)
        .map(Wait::new)
        .map_err(|_| CommandError::InvalidParameter {
            command: "Wait",
            parameter: "settle_delay_s",
            value: seconds,
        })
}

fn drive_forward(config: &RobotConfig) -> Result<DriveForward, CommandError> {
    DriveForward::new(
        Drivetrain::new(&config.drive),
        config.auto.drive_forward_distance_m,
        config.auto.drive_speed,
        config.timeouts.drive_forward_ticks,
    )
}

fn turn(config: &RobotConfig) -> Result<Turn, CommandError> {
    Turn::new(
        Drivetrain::new(&config.drive),
        config.auto.turn_degrees,
        config.auto.turn_speed,
        config.timeouts.turn_ticks,
    )
}

/// Build the autonomous command for `kind`.
///
/// # Errors
/// Any constructor rejection from the primitives involved.
pub fn build_routine(
    kind: RoutineKind,
    config: &RobotConfig,
) -> Result<Box<dyn Command>, CommandError> {
    let command: Box<dyn Command> = match kind {
        RoutineKind::DriveForward => Box::new(drive_forward(config)?),
        RoutineKind::Turn => Box::new(turn(config)?),
        RoutineKind::DriveAndTurn => Box::new(Sequence::new(vec![
            Box::new(drive_forward(config)?),
            Box::new(settle(config)?),
            Box::new(turn(config)?),
        ])),
        RoutineKind::PositionAndFeed => Box::new(Sequence::new(vec![
            Box::new(DriveToTargetDistance::new(
                Drivetrain::new(&config.drive),
                &config.positioning,
            )?),
            Box::new(settle(config)?),
            Box::new(ActuatorRun::from_roller(
                feeder(config),
                config.timeouts.actuator_run_ticks,
            )?),
        ])),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRobot;

    #[test]
    fn defaults_cover_every_handle() {
        let mut scheduler = CommandScheduler::new();
        let mut sim = SimRobot::default();
        configure(&mut scheduler, &RobotConfig::default()).unwrap();

        let report = scheduler.tick(&mut sim);
        assert_eq!(report.defaults_started, 3);
        for id in ActuatorId::ALL {
            assert!(scheduler.holder_of(id).is_some(), "{id} idle");
        }
        let drive = scheduler.holder_of(ActuatorId::DriveLeft).unwrap();
        assert_eq!(scheduler.name_of(drive), Some("ArcadeDrive"));
    }

    #[test]
    fn intake_button_preempts_idle() {
        let config = RobotConfig::default();
        let mut scheduler = CommandScheduler::new();
        let mut sim = SimRobot::default();
        configure(&mut scheduler, &config).unwrap();
        scheduler.tick(&mut sim);

        sim.set_button(config.operator.intake_button, true);
        scheduler.tick(&mut sim);
        let holder = scheduler.holder_of(ActuatorId::Intake).unwrap();
        assert_eq!(scheduler.name_of(holder), Some("ActuatorHold"));
        assert_eq!(sim.velocity_setpoint(ActuatorId::Intake), Some(20.0));

        sim.set_button(config.operator.intake_button, false);
        scheduler.tick(&mut sim);
        let holder = scheduler.holder_of(ActuatorId::Intake).unwrap();
        assert_eq!(scheduler.name_of(holder), Some("ActuatorIdle"));
        assert_eq!(sim.output(ActuatorId::Intake), 0.0);
        assert_eq!(sim.velocity_setpoint(ActuatorId::Intake), None);
    }

    #[test]
    fn routines_have_expected_requirements() {
        let config = RobotConfig::default();
        let cases = [
            (RoutineKind::DriveForward, "DriveForward", Requirements::DRIVETRAIN),
            (RoutineKind::Turn, "Turn", Requirements::DRIVETRAIN),
            (RoutineKind::DriveAndTurn, "Sequence", Requirements::DRIVETRAIN),
            (
                RoutineKind::PositionAndFeed,
                "Sequence",
                Requirements::DRIVETRAIN | Requirements::FEEDER,
            ),
        ];
        for (kind, name, requirements) in cases {
            let routine = build_routine(kind, &config).unwrap();
            assert_eq!(routine.name(), name);
            assert_eq!(routine.requirements(), requirements);
        }
    }

    #[test]
    fn bad_auto_parameters_are_rejected() {
        let mut config = RobotConfig::default();
        config.auto.drive_forward_distance_m = -1.0;
        assert!(build_routine(RoutineKind::DriveForward, &config).is_err());

        let mut config = RobotConfig::default();
        config.auto.settle_delay_s = f64::NAN;
        assert!(build_routine(RoutineKind::DriveAndTurn, &config).is_err());
    }
}
