//! The command lifecycle contract.
//!
//! ```text
//! Idle ──schedule──► Activated ──initialize──► Running ──end(interrupted)──► Terminated
//!                                               │  ▲
//!                                               └──┘ execute + is_finished, once per tick
//! ```
//!
//! `end` runs exactly once per activated instance, whether the command
//! finished on its own (`interrupted = false`), lost a requirement to a newer
//! command, was cancelled, or returned an error (`interrupted = true`).
//! Instances are discarded afterwards; factories build a fresh one for every
//! activation.

use std::fmt;

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;

use crate::error::CommandError;

/// Handle to a scheduled command instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) u64);

impl CommandId {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A closed- or open-loop routine driven by the scheduler.
pub trait Command {
    /// Short static name for logs.
    fn name(&self) -> &'static str;

    /// Actuator handles this command needs exclusive access to.
    fn requirements(&self) -> Requirements;

    /// Capture baselines, reset controllers and timeouts.
    fn initialize(&mut self, _hw: &mut dyn Hardware) -> Result<(), CommandError> {
        Ok(())
    }

    /// One control-law step.
    fn execute(&mut self, _hw: &mut dyn Hardware) -> Result<(), CommandError> {
        Ok(())
    }

    /// Completion predicate, evaluated right after `execute`.
    fn is_finished(&mut self, _hw: &dyn Hardware) -> Result<bool, CommandError> {
        Ok(false)
    }

    /// Terminal step; typically zeroes the owned actuators.
    fn end(&mut self, _hw: &mut dyn Hardware, _interrupted: bool) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Builds a fresh command instance per activation.
pub type CommandFactory = Box<dyn FnMut() -> Box<dyn Command>>;
