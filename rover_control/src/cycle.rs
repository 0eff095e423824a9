//! Fixed-period cycle runner.
//!
//! Owns the hardware, the scheduler and the robot mode. Each cycle is one
//! scheduler tick (or the disabled hold), followed by a driver hook and a
//! sleep for the remainder of the period.
//!
//! ## Modes
//! - **Disabled**: scheduler not ticked; every actuator receives
//!   `drive.disabled_brake_power` as an open-loop output.
//! - **Autonomous**: the configured routine is scheduled on entry.
//! - **Teleop**: defaults and operator bindings only.
//!
//! Every mode transition cancels all commands first.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rover_common::config::{ConfigError, Validate};
use rover_common::hal::driver::{HalError, Hardware};
use rover_common::hal::types::ActuatorId;
use rover_common::robot::RobotConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::command::lifecycle::CommandId;
use crate::command::scheduler::{CommandScheduler, TickReport};
use crate::error::{CommandError, SchedulerError, SetupError};
use crate::routine;
use crate::safety::latch::WarnLatch;
use crate::subsystem::drivetrain::Drivetrain;
use crate::subsystem::roller::Roller;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing and command statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u64,
    /// Cycles whose body exceeded the period.
    pub overruns: u64,
    /// Commands interrupted by a newer command.
    pub interrupted: u64,
    /// Commands terminated by a lifecycle error.
    pub errored: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            interrupted: 0,
            errored: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
    }

    #[inline]
    pub fn record_report(&mut self, report: &TickReport) {
        self.interrupted += u64::from(report.interrupted);
        self.errored += u64::from(report.errored);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count
        }
    }
}

// ─── Mode ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotMode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
}

impl fmt::Display for RobotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "disabled",
            Self::Autonomous => "autonomous",
            Self::Teleop => "teleop",
        })
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("routine error: {0}")]
    Command(#[from] CommandError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Loop options for [`CycleRunner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Stop after this many cycles.
    pub max_ticks: Option<u64>,
    /// Sleep out the remainder of each period.
    pub realtime: bool,
    /// Stop once the autonomous routine has finished.
    pub stop_when_routine_done: bool,
}

pub struct CycleRunner<H: Hardware> {
    config: RobotConfig,
    hw: H,
    scheduler: CommandScheduler,
    drivetrain: Drivetrain,
    rollers: [Roller; 2],
    mode: RobotMode,
    period: Duration,
    routine: Option<CommandId>,
    stats: CycleStats,
    hal_fault: WarnLatch,
    overrun: WarnLatch,
}

impl<H: Hardware> CycleRunner<H> {
    /// Validate `config`, wire defaults and bindings, start Disabled.
    pub fn new(config: RobotConfig, hw: H) -> Result<Self, CycleError> {
        config.validate()?;

        let mut scheduler = CommandScheduler::new();
        routine::configure(&mut scheduler, &config)?;

        let period = config.cycle.period();
        info!(
            period_ms = period.as_millis() as u64,
            routine = ?config.auto.routine,
            "cycle runner ready"
        );

        Ok(Self {
            drivetrain: Drivetrain::new(&config.drive),
            rollers: [routine::feeder(&config), routine::intake(&config)],
            config,
            hw,
            scheduler,
            mode: RobotMode::Disabled,
            period,
            routine: None,
            stats: CycleStats::new(),
            hal_fault: WarnLatch::new(),
            overrun: WarnLatch::new(),
        })
    }

    /// Cancel everything, then enter `mode`. Entering Autonomous schedules
    /// the configured routine.
    pub fn set_mode(&mut self, mode: RobotMode) -> Result<(), CycleError> {
        if mode == self.mode {
            return Ok(());
        }
        self.scheduler.cancel_all(&mut self.hw);
        self.routine = None;
        info!(from = %self.mode, to = %mode, "mode transition");
        self.mode = mode;

        if mode == RobotMode::Autonomous {
            let command = routine::build_routine(self.config.auto.routine, &self.config)?;
            let id = self.scheduler.schedule(command)?;
            info!(%id, routine = ?self.config.auto.routine, "autonomous routine scheduled");
            self.routine = Some(id);
        }
        Ok(())
    }

    /// Run one cycle body without pacing.
    pub fn step(&mut self) -> TickReport {
        let report = match self.mode {
            RobotMode::Disabled => {
                self.hold_disabled();
                TickReport::default()
            }
            RobotMode::Autonomous | RobotMode::Teleop => self.scheduler.tick(&mut self.hw),
        };
        self.stats.record_report(&report);
        report
    }

    /// Cycle until `running` clears or an option stops the loop.
    ///
    /// `after_tick` runs once per cycle with the period; simulation drivers
    /// advance their clock there.
    pub fn run<F>(&mut self, running: &AtomicBool, options: RunOptions, mut after_tick: F)
    where
        F: FnMut(&mut H, Duration),
    {
        info!(mode = %self.mode, ?options, "cycle loop started");
        while running.load(Ordering::Relaxed) {
            if options
                .max_ticks
                .is_some_and(|max| self.stats.cycle_count >= max)
            {
                break;
            }
            if options.stop_when_routine_done && self.routine_finished() {
                info!(cycles = self.stats.cycle_count, "autonomous routine complete");
                break;
            }

            let cycle_start = Instant::now();
            let report = self.step();
            after_tick(&mut self.hw, self.period);
            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed.as_nanos() as u64);

            if report.errored > 0 {
                debug!(errored = report.errored, "commands terminated by error");
            }

            if elapsed > self.period {
                self.stats.overruns += 1;
                if self.overrun.raise() {
                    warn!(
                        elapsed_us = elapsed.as_micros() as u64,
                        period_us = self.period.as_micros() as u64,
                        "cycle overrun"
                    );
                }
            } else {
                self.overrun.clear();
                if options.realtime {
                    std::thread::sleep(self.period - elapsed);
                }
            }
        }
        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            "cycle loop stopped"
        );
    }

    fn hold_disabled(&mut self) {
        match self.write_disabled() {
            Ok(()) => self.hal_fault.clear(),
            Err(e) => {
                if self.hal_fault.raise() {
                    error!(error = %e, "disabled hold write failed");
                }
            }
        }
    }

    fn write_disabled(&mut self) -> Result<(), HalError> {
        self.drivetrain.brake(&mut self.hw)?;
        let power = self.drivetrain.brake_power();
        for roller in &self.rollers {
            roller.set_output(&mut self.hw, power)?;
        }
        Ok(())
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> RobotMode {
        self.mode
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    #[inline]
    pub fn scheduler(&self) -> &CommandScheduler {
        &self.scheduler
    }

    #[inline]
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    #[inline]
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Name of the command currently holding `id`.
    pub fn holder_name(&self, id: ActuatorId) -> Option<&'static str> {
        self.scheduler
            .holder_of(id)
            .and_then(|cmd| self.scheduler.name_of(cmd))
    }

    /// True once the autonomous routine scheduled on entry has left the
    /// scheduler (finished, errored or interrupted).
    pub fn routine_finished(&self) -> bool {
        self.routine
            .is_some_and(|id| !self.scheduler.is_scheduled(id))
    }

    /// Consume the runner and return the hardware.
    pub fn into_hardware(self) -> H {
        self.hw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRobot;
    use rover_common::hal::driver::{ActuatorSink, Clock};

    fn runner(config: RobotConfig) -> CycleRunner<SimRobot> {
        CycleRunner::new(config, SimRobot::default()).unwrap()
    }

    #[test]
    fn stats_track_min_max_avg() {
        let mut stats = CycleStats::new();
        assert_eq!(stats.avg_cycle_ns(), 0);
        for ns in [300, 100, 200] {
            stats.record(ns);
        }
        assert_eq!(stats.cycle_count, 3);
        assert_eq!(stats.min_cycle_ns, 100);
        assert_eq!(stats.max_cycle_ns, 300);
        assert_eq!(stats.last_cycle_ns, 200);
        assert_eq!(stats.avg_cycle_ns(), 200);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = RobotConfig::default();
        config.cycle.tick_period_ms = 0;
        assert!(matches!(
            CycleRunner::new(config, SimRobot::default()),
            Err(CycleError::Config(_))
        ));
    }

    #[test]
    fn disabled_applies_brake_power() {
        let mut config = RobotConfig::default();
        config.drive.disabled_brake_power = -0.15;
        let mut runner = runner(config);
        runner.hardware_mut().set_output(ActuatorId::Feeder, 0.4).unwrap();

        let report = runner.step();
        assert_eq!(report, TickReport::default());
        let sim = runner.hardware();
        assert_eq!(sim.output(ActuatorId::DriveLeft), -0.15);
        assert_eq!(sim.output(ActuatorId::DriveRight), -0.15);
        assert_eq!(sim.output(ActuatorId::Feeder), -0.15);
        assert_eq!(sim.output(ActuatorId::Intake), -0.15);
        assert_eq!(runner.scheduler().active_count(), 0);
    }

    #[test]
    fn disabled_with_default_brake_idles_everything() {
        let mut runner = runner(RobotConfig::default());
        runner.hardware_mut().set_output(ActuatorId::Intake, 0.4).unwrap();
        runner.step();
        for id in ActuatorId::ALL {
            assert_eq!(runner.hardware().output(id), 0.0, "{id}");
        }
    }

    #[test]
    fn persistent_intake_fault_is_counted_once() {
        let mut runner = runner(RobotConfig::default());
        runner.hardware_mut().fail_actuator(ActuatorId::Intake, true);
        runner.set_mode(RobotMode::Teleop).unwrap();

        let errored: Vec<u32> = (0..10).map(|_| runner.step().errored).collect();
        assert_eq!(errored, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(runner.holder_name(ActuatorId::Intake), None);
        assert_eq!(runner.holder_name(ActuatorId::Feeder), Some("ActuatorIdle"));

        runner.hardware_mut().fail_actuator(ActuatorId::Intake, false);
        runner.step();
        assert_eq!(runner.holder_name(ActuatorId::Intake), Some("ActuatorIdle"));
    }

    #[test]
    fn teleop_runs_defaults() {
        let mut runner = runner(RobotConfig::default());
        runner.set_mode(RobotMode::Teleop).unwrap();
        runner.hardware_mut().set_axis(1, -1.0);
        runner.step();

        assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("ArcadeDrive"));
        assert_eq!(runner.holder_name(ActuatorId::Feeder), Some("ActuatorIdle"));
        assert!(runner.hardware().output(ActuatorId::DriveLeft) > 0.0);
    }

    #[test]
    fn autonomous_drive_forward_completes() {
        let mut runner = runner(RobotConfig::default());
        runner.set_mode(RobotMode::Autonomous).unwrap();
        assert!(!runner.routine_finished());

        let period = runner.period();
        let done_at = (1..=200).find(|_| {
            runner.step();
            runner.hardware_mut().advance(period);
            runner.routine_finished()
        });
        assert!(done_at.is_some());

        let drivetrain = Drivetrain::new(&runner.config().drive);
        let travelled = drivetrain.average_meters(runner.hardware()).unwrap();
        assert!(travelled >= 0.5, "travelled {travelled}");
    }

    #[test]
    fn leaving_autonomous_cancels_routine() {
        let mut runner = runner(RobotConfig::default());
        runner.set_mode(RobotMode::Autonomous).unwrap();
        runner.step();
        assert_eq!(runner.holder_name(ActuatorId::DriveLeft), Some("DriveForward"));
        assert_eq!(runner.hardware().output(ActuatorId::DriveLeft), 0.5);

        runner.set_mode(RobotMode::Disabled).unwrap();
        assert_eq!(runner.scheduler().active_count(), 0);
        assert_eq!(runner.hardware().output(ActuatorId::DriveLeft), 0.0);
        assert!(!runner.routine_finished());
    }

    #[test]
    fn run_honours_tick_limit_and_flag() {
        let mut runner = runner(RobotConfig::default());
        runner.set_mode(RobotMode::Teleop).unwrap();
        let running = AtomicBool::new(true);
        let mut hooks = 0;
        runner.run(
            &running,
            RunOptions {
                max_ticks: Some(10),
                ..RunOptions::default()
            },
            |sim, dt| {
                hooks += 1;
                sim.advance(dt);
            },
        );
        assert_eq!(runner.stats().cycle_count, 10);
        assert_eq!(hooks, 10);
        assert_eq!(runner.hardware().elapsed(), runner.period() * 10);

        running.store(false, Ordering::Relaxed);
        runner.run(&running, RunOptions::default(), |_, _| {});
        assert_eq!(runner.stats().cycle_count, 10);
    }

    #[test]
    fn run_stops_when_routine_done() {
        let mut config = RobotConfig::default();
        config.auto.drive_forward_distance_m = 0.0;
        let mut runner = runner(config);
        runner.set_mode(RobotMode::Autonomous).unwrap();
        runner.run(
            &AtomicBool::new(true),
            RunOptions {
                max_ticks: Some(50),
                stop_when_routine_done: true,
                ..RunOptions::default()
            },
            |sim, dt| sim.advance(dt),
        );
        assert_eq!(runner.stats().cycle_count, 1);
        assert!(runner.routine_finished());
    }
}
