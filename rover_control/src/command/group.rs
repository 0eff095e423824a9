//! Sequential composition and timed waits for autonomous routines.

use std::time::Duration;

use rover_common::hal::driver::Hardware;
use rover_common::hal::types::Requirements;
use tracing::debug;

use super::lifecycle::Command;
use crate::error::CommandError;
use crate::safety::timeout::DeadlineTimeout;

/// Runs children one after another.
///
/// Requirements are the union of all children, held for the whole run.
/// A child that finishes is ended and the next one initialized within the
/// same tick; interrupting the sequence interrupts the current child only.
pub struct Sequence {
    children: Vec<Box<dyn Command>>,
    requirements: Requirements,
    index: usize,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Command>>) -> Self {
        let requirements = children
            .iter()
            .fold(Requirements::empty(), |acc, c| acc | c.requirements());
        Self {
            children,
            requirements,
            index: 0,
        }
    }

    /// Index of the child currently running.
    #[inline]
    pub fn current(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Command for Sequence {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn requirements(&self) -> Requirements {
        self.requirements
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.index = 0;
        if let Some(first) = self.children.first_mut() {
            first.initialize(hw)?;
        }
        Ok(())
    }

    fn execute(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        let Some(child) = self.children.get_mut(self.index) else {
            return Ok(());
        };

        child.execute(hw)?;
        if child.is_finished(hw)? {
            let ended = child.end(hw, false);
            debug!(step = self.index, child = child.name(), "sequence step complete");
            // A child is ended exactly once, even when its `end` fails.
            self.index += 1;
            ended?;
            if let Some(next) = self.children.get_mut(self.index) {
                next.initialize(hw)?;
            }
        }
        Ok(())
    }

    fn is_finished(&mut self, _hw: &dyn Hardware) -> Result<bool, CommandError> {
        Ok(self.index >= self.children.len())
    }

    fn end(&mut self, hw: &mut dyn Hardware, interrupted: bool) -> Result<(), CommandError> {
        if interrupted && let Some(child) = self.children.get_mut(self.index) {
            child.end(hw, true)?;
        }
        Ok(())
    }
}

/// Finishes once `duration` of driver clock time has passed.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    deadline: DeadlineTimeout,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: DeadlineTimeout::new(duration),
        }
    }
}

impl Command for Wait {
    fn name(&self) -> &'static str {
        "Wait"
    }

    fn requirements(&self) -> Requirements {
        Requirements::empty()
    }

    fn initialize(&mut self, hw: &mut dyn Hardware) -> Result<(), CommandError> {
        self.deadline.start(hw.elapsed());
        Ok(())
    }

    fn is_finished(&mut self, hw: &dyn Hardware) -> Result<bool, CommandError> {
        Ok(self.deadline.expired(hw.elapsed()))
    }
}
