//! # Rover Control
//!
//! Runs the control core against the in-process simulator: loads the
//! robot configuration, enters the requested mode, cycles at the configured
//! period and drops to Disabled on completion or Ctrl-C.

use clap::{Parser, ValueEnum};
use rover_common::config::{ConfigError, ConfigLoader, LogLevel};
use rover_common::consts::DEFAULT_CONFIG_PATH;
use rover_common::hal::driver::ActuatorSink;
use rover_common::hal::types::ActuatorId;
use rover_common::robot::RobotConfig;
use rover_common::robot::config::RoutineKind;
use rover_control::cycle::{CycleRunner, RobotMode, RunOptions};
use rover_control::sim::{SensorMount, SimConfig, SimRobot};
use rover_control::subsystem::drivetrain::Drivetrain;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Autonomous,
    Teleop,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum RoutineArg {
    DriveForward,
    Turn,
    DriveAndTurn,
    PositionAndFeed,
}

impl From<RoutineArg> for RoutineKind {
    fn from(arg: RoutineArg) -> Self {
        match arg {
            RoutineArg::DriveForward => Self::DriveForward,
            RoutineArg::Turn => Self::Turn,
            RoutineArg::DriveAndTurn => Self::DriveAndTurn,
            RoutineArg::PositionAndFeed => Self::PositionAndFeed,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum MountArg {
    Front,
    Rear,
}

/// Rover control core on the simulated robot
#[derive(Parser, Debug)]
#[command(name = "rover_control")]
#[command(version)]
#[command(about = "Periodic closed-loop control core for a two-wheel-drive rover")]
struct Args {
    /// Path to the robot configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Mode entered after start-up.
    #[arg(long, value_enum, default_value_t = ModeArg::Autonomous)]
    mode: ModeArg,

    /// Override the configured autonomous routine.
    #[arg(long, value_enum)]
    routine: Option<RoutineArg>,

    /// Stop after this many cycles.
    #[arg(long)]
    ticks: Option<u64>,

    /// Side of the chassis the simulated range pair faces.
    #[arg(long, value_enum, default_value_t = MountArg::Front)]
    mount: MountArg,

    /// Starting distance between the range sensors and the target [m].
    #[arg(long, default_value_t = 1.0)]
    wall: f64,

    /// Do not sleep between cycles.
    #[arg(long)]
    fast: bool,

    /// Enable verbose logging (DEBUG level, overrides `shared.log_level`).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The configured log level must be known before the subscriber exists.
    let (config, missing) = match load_config(&args.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!("Rover Control v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = missing {
        warn!("Config '{path}' not found, using built-in defaults");
    }

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Rover Control shutdown complete");
}

/// Load and validate the configuration. A missing file yields the defaults
/// together with the path that was tried.
fn load_config(path: &Path) -> Result<(RobotConfig, Option<String>), ConfigError> {
    match RobotConfig::load_validated(path) {
        Ok(config) => Ok((config, None)),
        Err(ConfigError::FileNotFound(missing)) => Ok((RobotConfig::default(), Some(missing))),
        Err(e) => Err(e),
    }
}

fn run(args: &Args, mut config: RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(routine) = args.routine {
        config.auto.routine = routine.into();
    }

    let sim = SimRobot::new(SimConfig {
        mount: match args.mount {
            MountArg::Front => SensorMount::Front,
            MountArg::Rear => SensorMount::Rear,
        },
        wall_distance_m: args.wall,
        ..SimConfig::from_drive(&config.drive)
    });

    let mut runner = CycleRunner::new(config, sim)?;
    info!(
        "Config OK: period={}ms, routine={:?}",
        runner.period().as_millis(),
        runner.config().auto.routine
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mode = match args.mode {
        ModeArg::Autonomous => RobotMode::Autonomous,
        ModeArg::Teleop => RobotMode::Teleop,
    };
    runner.set_mode(mode)?;
    runner.run(
        &running,
        RunOptions {
            max_ticks: args.ticks,
            realtime: !args.fast,
            stop_when_routine_done: mode == RobotMode::Autonomous,
        },
        |sim, dt| sim.advance(dt),
    );

    runner.set_mode(RobotMode::Disabled)?;
    runner.step();

    let stats = runner.stats();
    info!(
        "Cycles: {} (avg {}µs, max {}µs, overruns {}, interrupted {}, errored {})",
        stats.cycle_count,
        stats.avg_cycle_ns() / 1_000,
        stats.max_cycle_ns / 1_000,
        stats.overruns,
        stats.interrupted,
        stats.errored,
    );

    let drivetrain = Drivetrain::new(&runner.config().drive);
    let sim = runner.hardware();
    info!(
        "Final: left={:.3}m right={:.3}m feeder={:.2}rot",
        drivetrain.left_meters(sim)?,
        drivetrain.right_meters(sim)?,
        sim.position(ActuatorId::Feeder)?,
    );
    Ok(())
}

/// `--verbose` beats the configured level; `RUST_LOG` beats both.
fn base_level(verbose: bool, configured: LogLevel) -> LogLevel {
    if verbose { LogLevel::Debug } else { configured }
}

fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = base_level(args.verbose, configured);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
