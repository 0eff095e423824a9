//! Cooperative command scheduler.
//!
//! One `tick` per control period, run to completion on the caller's thread:
//!
//! 1. **Bindings**: poll button edges, schedule or cancel bound commands.
//! 2. **Admission**: for every pending command, interrupt active commands
//!    sharing a requirement (`end(true)`), then `initialize` it.
//! 3. **Step**: `execute` + `is_finished` on every active command in
//!    admission order; finished commands are retired with `end(false)`.
//! 4. **Defaults**: every default whose requirements are all free gets a
//!    fresh instance, initialized and stepped in the same tick.
//!
//! Admission always precedes stepping, so an interrupted command never
//! writes in the tick it loses its actuators. A command returning an error
//! from any step is terminated with `end(true)` and counted in the report.
//! A default command that keeps failing is rebuilt every tick but logged
//! and counted once per fault episode; the episode ends with its first
//! successful step.
//!
//! Pending, active, binding and default tables are fixed-capacity
//! `heapless::Vec`s; overflows are reported at schedule/registration time.

use heapless::Vec;
use rover_common::consts::{MAX_ACTIVE_COMMANDS, MAX_BINDINGS, MAX_DEFAULT_COMMANDS};
use rover_common::hal::driver::Hardware;
use rover_common::hal::types::{ActuatorId, Requirements};
use tracing::{debug, error, warn};

use super::binding::{Binding, BindingAction, BindingKind};
use super::lifecycle::{Command, CommandFactory, CommandId};
use crate::error::{CommandError, SchedulerError};
use crate::safety::latch::WarnLatch;

// ─── Tables ─────────────────────────────────────────────────────────

struct Slot {
    id: CommandId,
    requirements: Requirements,
    command: Box<dyn Command>,
    /// Index into the default table when built by a default factory.
    default: Option<usize>,
}

struct DefaultEntry {
    requirements: Requirements,
    factory: CommandFactory,
    failure: WarnLatch,
}

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Pending commands initialized this tick.
    pub admitted: u32,
    /// Active commands ended because a newer command took a requirement.
    pub interrupted: u32,
    /// Commands retired by their completion predicate.
    pub finished: u32,
    /// Commands terminated because a lifecycle step returned an error.
    /// A default command failing tick after tick counts once per episode.
    pub errored: u32,
    /// Default commands (re)started.
    pub defaults_started: u32,
    /// Active commands after the tick.
    pub active: u32,
}

// ─── Scheduler ──────────────────────────────────────────────────────

pub struct CommandScheduler {
    next_id: u64,
    pending: Vec<Slot, MAX_ACTIVE_COMMANDS>,
    active: Vec<Slot, MAX_ACTIVE_COMMANDS>,
    bindings: Vec<Binding, MAX_BINDINGS>,
    defaults: Vec<DefaultEntry, MAX_DEFAULT_COMMANDS>,
}

impl Default for CommandScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandScheduler {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
            active: Vec::new(),
            bindings: Vec::new(),
            defaults: Vec::new(),
        }
    }

    /// Queue a command for admission at the start of the next tick.
    ///
    /// # Errors
    /// `SchedulerError::QueueFull` when pending + active slots are exhausted.
    pub fn schedule(&mut self, command: Box<dyn Command>) -> Result<CommandId, SchedulerError> {
        if self.pending.len() + self.active.len() >= MAX_ACTIVE_COMMANDS {
            return Err(SchedulerError::QueueFull(MAX_ACTIVE_COMMANDS));
        }
        let id = self.allocate_id();
        let requirements = command.requirements();
        debug!(%id, command = command.name(), ?requirements, "scheduled");
        self.pending
            .push(Slot {
                id,
                requirements,
                command,
                default: None,
            })
            .map_err(|_| SchedulerError::QueueFull(MAX_ACTIVE_COMMANDS))?;
        Ok(id)
    }

    /// Interrupt one command now. Returns false if `id` is not scheduled.
    ///
    /// A pending command is dropped without any lifecycle call; an active
    /// one runs `end(true)` before this returns.
    pub fn cancel(&mut self, id: CommandId, hw: &mut dyn Hardware) -> bool {
        if let Some(pos) = self.pending.iter().position(|s| s.id == id) {
            let slot = self.pending.remove(pos);
            debug!(%id, command = slot.command.name(), "cancelled before admission");
            return true;
        }
        if let Some(pos) = self.active.iter().position(|s| s.id == id) {
            let slot = self.active.remove(pos);
            terminate(slot, hw, true);
            return true;
        }
        false
    }

    /// Interrupt every scheduled command (mode transitions, disable).
    pub fn cancel_all(&mut self, hw: &mut dyn Hardware) {
        self.pending.clear();
        while let Some(slot) = self.active.pop() {
            terminate(slot, hw, true);
        }
    }

    /// Register the fallback command for a requirement set.
    ///
    /// The factory must build commands requiring exactly `requirements`.
    pub fn set_default_command(
        &mut self,
        requirements: Requirements,
        factory: CommandFactory,
    ) -> Result<(), SchedulerError> {
        if requirements.is_empty() {
            return Err(SchedulerError::EmptyDefault);
        }
        if let Some(entry) = self
            .defaults
            .iter()
            .find(|d| d.requirements.intersects(requirements))
        {
            return Err(SchedulerError::DefaultOverlap(
                entry.requirements & requirements,
            ));
        }
        self.defaults
            .push(DefaultEntry {
                requirements,
                factory,
                failure: WarnLatch::new(),
            })
            .map_err(|_| SchedulerError::DefaultTableFull(MAX_DEFAULT_COMMANDS))
    }

    /// Bind a command factory to an operator button.
    pub fn bind(
        &mut self,
        button: usize,
        kind: BindingKind,
        factory: CommandFactory,
    ) -> Result<(), SchedulerError> {
        self.bindings
            .push(Binding::new(button, kind, factory))
            .map_err(|_| SchedulerError::BindingTableFull(MAX_BINDINGS))
    }

    /// Pending or active.
    pub fn is_scheduled(&self, id: CommandId) -> bool {
        self.pending.iter().chain(self.active.iter()).any(|s| s.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Active command currently holding `actuator`.
    pub fn holder_of(&self, actuator: ActuatorId) -> Option<CommandId> {
        self.active
            .iter()
            .find(|s| s.requirements.contains(actuator.requirement()))
            .map(|s| s.id)
    }

    /// Name of a scheduled command.
    pub fn name_of(&self, id: CommandId) -> Option<&'static str> {
        self.pending
            .iter()
            .chain(self.active.iter())
            .find(|s| s.id == id)
            .map(|s| s.command.name())
    }

    /// Union of requirements held by active commands.
    pub fn held(&self) -> Requirements {
        self.active
            .iter()
            .fold(Requirements::empty(), |acc, s| acc | s.requirements)
    }

    /// Run one scheduling pass.
    pub fn tick(&mut self, hw: &mut dyn Hardware) -> TickReport {
        let mut report = TickReport::default();

        self.poll_bindings(hw);

        // ── Admission ───────────────────────────────────────────
        let pending = core::mem::take(&mut self.pending);
        for slot in pending {
            if self.admit(slot, hw, &mut report) {
                report.admitted += 1;
            }
        }

        // ── Step ────────────────────────────────────────────────
        let mut i = 0;
        while i < self.active.len() {
            if self.step(i, hw, &mut report) {
                i += 1;
            }
        }

        // ── Defaults ────────────────────────────────────────────
        self.run_defaults(hw, &mut report);

        report.active = self.active.len() as u32;
        report
    }

    // ─── Internals ──────────────────────────────────────────────

    fn allocate_id(&mut self) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        id
    }

    fn poll_bindings(&mut self, hw: &mut dyn Hardware) {
        for i in 0..self.bindings.len() {
            let running = self.bindings[i].running();
            let alive = running.is_some_and(|id| self.is_scheduled(id));
            let pressed = hw.button(self.bindings[i].button());

            match self.bindings[i].poll(pressed, alive) {
                BindingAction::None => {}
                BindingAction::Schedule => {
                    let command = self.bindings[i].create();
                    match self.schedule(command) {
                        Ok(id) => self.bindings[i].set_running(Some(id)),
                        Err(e) => warn!(button = self.bindings[i].button(), "binding dropped: {e}"),
                    }
                }
                BindingAction::Cancel(id) => {
                    self.cancel(id, hw);
                    self.bindings[i].set_running(None);
                }
            }
        }
    }

    /// Interrupt conflicting holders, then initialize `slot`. Returns true
    /// if the command became active.
    fn admit(&mut self, mut slot: Slot, hw: &mut dyn Hardware, report: &mut TickReport) -> bool {
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].requirements.intersects(slot.requirements) {
                let holder = self.active.remove(i);
                debug!(
                    interrupted = holder.command.name(),
                    by = slot.command.name(),
                    "requirement conflict"
                );
                terminate(holder, hw, true);
                report.interrupted += 1;
            } else {
                i += 1;
            }
        }

        if let Err(e) = slot.command.initialize(hw) {
            let loud = self.note_failure(&slot, "initialize", &e, report);
            discard(slot, hw, loud);
            return false;
        }

        match self.active.push(slot) {
            Ok(()) => true,
            Err(slot) => {
                // Capacity is checked in `schedule`; defaults check before admitting.
                warn!(command = slot.command.name(), "active table full, dropping");
                terminate(slot, hw, true);
                false
            }
        }
    }

    /// Execute + evaluate the command at `index`. Returns true if it stays active.
    fn step(&mut self, index: usize, hw: &mut dyn Hardware, report: &mut TickReport) -> bool {
        let slot = &mut self.active[index];
        let outcome = match slot.command.execute(hw) {
            Ok(()) => slot.command.is_finished(hw),
            Err(e) => Err(e),
        };

        if outcome.is_ok()
            && let Some(entry) = slot.default.and_then(|d| self.defaults.get_mut(d))
        {
            entry.failure.clear();
        }

        match outcome {
            Ok(false) => true,
            Ok(true) => {
                let slot = self.active.remove(index);
                terminate(slot, hw, false);
                report.finished += 1;
                false
            }
            Err(e) => {
                let slot = self.active.remove(index);
                let loud = self.note_failure(&slot, "step", &e, report);
                discard(slot, hw, loud);
                false
            }
        }
    }

    /// Log and count a lifecycle failure. Returns false when the failure
    /// belongs to a default command already reported in this episode.
    fn note_failure(
        &mut self,
        slot: &Slot,
        phase: &str,
        e: &CommandError,
        report: &mut TickReport,
    ) -> bool {
        let loud = match slot.default.and_then(|d| self.defaults.get_mut(d)) {
            Some(entry) => entry.failure.raise(),
            None => true,
        };
        if loud {
            log_failure(slot, phase, e);
            report.errored += 1;
        } else {
            debug!(id = %slot.id, command = slot.command.name(), phase, "default command still failing: {e}");
        }
        loud
    }

    fn run_defaults(&mut self, hw: &mut dyn Hardware, report: &mut TickReport) {
        for d in 0..self.defaults.len() {
            if self.held().intersects(self.defaults[d].requirements) {
                continue;
            }
            if self.active.is_full() {
                warn!("active table full, default command skipped");
                return;
            }

            let command = (self.defaults[d].factory)();
            let id = self.allocate_id();
            let slot = Slot {
                id,
                requirements: command.requirements(),
                command,
                default: Some(d),
            };
            debug!(%id, command = slot.command.name(), "default command started");

            if self.admit(slot, hw, report) {
                report.defaults_started += 1;
                let last = self.active.len() - 1;
                self.step(last, hw, report);
            }
        }
    }
}

fn terminate(mut slot: Slot, hw: &mut dyn Hardware, interrupted: bool) {
    match slot.command.end(hw, interrupted) {
        Ok(()) => debug!(id = %slot.id, command = slot.command.name(), interrupted, "ended"),
        Err(e) => error!(id = %slot.id, command = slot.command.name(), "end failed: {e}"),
    }
}

/// `end(true)` after a failed step. A failing `end` is only logged as an
/// error when the original failure was.
fn discard(mut slot: Slot, hw: &mut dyn Hardware, loud: bool) {
    match slot.command.end(hw, true) {
        Ok(()) => debug!(id = %slot.id, command = slot.command.name(), "ended after failure"),
        Err(e) if loud => error!(id = %slot.id, command = slot.command.name(), "end failed: {e}"),
        Err(e) => debug!(id = %slot.id, command = slot.command.name(), "end failed: {e}"),
    }
}

fn log_failure(slot: &Slot, phase: &str, e: &CommandError) {
    error!(id = %slot.id, command = slot.command.name(), phase, "command failed: {e}");
}
