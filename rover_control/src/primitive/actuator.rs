//! Roller primitives: bounded run, continuous hold, and idle.

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use tracing::{debug, warn};

use crate::command::lifecycle::Command;
use crate::error::CommandError;
use crate::safety::timeout::TickTimeout;
use crate::subsystem::roller::Roller;

const RUN: &str = "ActuatorRun";

/// Runs a roller until its encoder has moved `rotations` (either
/// direction) or the tick backstop expires.
#[derive(Debug, Clone)]
pub struct ActuatorRun {
    roller: Roller,
    rotations: f64,
    baseline: f64,
    timeout: TickTimeout,
}

impl ActuatorRun {
    /// # Errors
    /// `InvalidParameter` for a non-finite or negative rotation count.
    pub fn new(roller: Roller, rotations: f64, timeout_ticks: u32) -> Result<Self, CommandError> {
        let rotations = CommandError::check_non_negative(RUN, "rotations", rotations)?;
        Ok(Self {
            roller,
            rotations,
            baseline: 0.0,
            timeout: TickTimeout::new(timeout_ticks),
        })
    }

    /// Use the roller's configured `run_rotations`.
    pub fn from_roller(roller: Roller, timeout_ticks: u32) -> Result<Self, CommandError> {
        let rotations = roller.config().run_rotations;
        Self::new(roller, rotations, timeout_ticks)
    }

    #[inline]
    pub fn rotations(&self) -> f64 {
        self.rotations
    }

    fn progress(&self, hw: &dyn Hardware) -> Result<f64, CommandError> {
        Ok((self.roller.position(hw)? - self.baseline).abs())
    }
}

impl Command for ActuatorRun {
    fn name(&self) -> &'static str {
        RUN
    }

    fn requirements(&self) -> Requirements {
        self.roller.id().requirement()
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.roller.reset_position(hw)?;
        self.baseline = self.roller.position(hw)?;
        self.timeout.reset();
        debug!(actuator = %self.roller.id(), rotations = self.rotations, "run started");
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        if self.progress(hw)? >= self.rotations {
            self.roller.stop(hw)?;
        } else {
            self.roller.run(hw)?;
        }
        Ok(())
    }

    fn is_finished(&mut self, hw: &dyn Hardware) -> Result<bool, CommandError> {
        if self.progress(hw)? >= self.rotations {
            return Ok(true);
        }
        if self.timeout.tick() {
            warn!(
                actuator = %self.roller.id(),
                ticks = self.timeout.limit(),
                "{RUN} timed out"
            );
            return Ok(true);
        }
        Ok(false)
    }

    fn end(&mut self, hw: &mut dyn Hardware, _interrupted: bool) -> Result<(), CommandError> {
        self.roller.stop(hw)?;
        Ok(())
    }
}

/// Runs a roller at its configured setpoint until interrupted.
#[derive(Debug, Clone)]
pub struct ActuatorHold {
    roller: Roller,
}

impl ActuatorHold {
    pub fn new(roller: Roller) -> Self {
        Self { roller }
    }
}

impl Command for ActuatorHold {
    fn name(&self) -> &'static str {
        "ActuatorHold"
    }

    fn requirements(&self) -> Requirements {
        self.roller.id().requirement()
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.roller.run(hw)?;
        Ok(())
    }

    fn end(&mut self, hw: &mut dyn Hardware, _interrupted: bool) -> Result<(), CommandError> {
        self.roller.stop(hw)?;
        Ok(())
    }
}

/// Holds a roller at zero output. Registered as the roller's default.
#[derive(Debug, Clone)]
pub struct ActuatorIdle {
    roller: Roller,
}

impl ActuatorIdle {
    pub fn new(roller: Roller) -> Self {
        Self { roller }
    }
}

impl Command for ActuatorIdle {
    fn name(&self) -> &'static str {
        "ActuatorIdle"
    }

    fn requirements(&self) -> Requirements {
        self.roller.id().requirement()
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.roller.stop(hw)?;
        Ok(())
    }
}
