//! Operator button bindings.
//!
//! Each binding watches one button level and turns its edges into
//! schedule/cancel actions on a command produced by its factory:
//!
//! | Kind | Rising edge | Falling edge |
//! |------|-------------|--------------|
//! | `WhileHeld` | schedule | cancel if still running |
//! | `OnPress` | schedule | - |
//! | `Toggle` | cancel if running, else schedule | - |

use super::lifecycle::{Command, CommandFactory, CommandId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    WhileHeld,
    OnPress,
    Toggle,
}

/// Action requested by a binding for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    None,
    Schedule,
    Cancel(CommandId),
}

pub struct Binding {
    button: usize,
    kind: BindingKind,
    factory: CommandFactory,
    was_pressed: bool,
    running: Option<CommandId>,
}

impl Binding {
    pub fn new(button: usize, kind: BindingKind, factory: CommandFactory) -> Self {
        Self {
            button,
            kind,
            factory,
            was_pressed: false,
            running: None,
        }
    }

    #[inline]
    pub fn button(&self) -> usize {
        self.button
    }

    #[inline]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Last command this binding scheduled, if any.
    #[inline]
    pub fn running(&self) -> Option<CommandId> {
        self.running
    }

    #[inline]
    pub(crate) fn set_running(&mut self, id: Option<CommandId>) {
        self.running = id;
    }

    #[inline]
    pub(crate) fn create(&mut self) -> Box<dyn Command> {
        (self.factory)()
    }

    /// Feed the current button level. `alive` tells whether the command
    /// recorded in `running` is still scheduled.
    pub fn poll(&mut self, pressed: bool, alive: bool) -> BindingAction {
        let rising = pressed && !self.was_pressed;
        let falling = !pressed && self.was_pressed;
        self.was_pressed = pressed;

        if !alive {
            self.running = None;
        }

        match (self.kind, self.running) {
            (BindingKind::WhileHeld, _) | (BindingKind::OnPress, _) if rising => {
                BindingAction::Schedule
            }
            (BindingKind::WhileHeld, Some(id)) if falling => BindingAction::Cancel(id),
            (BindingKind::Toggle, Some(id)) if rising => BindingAction::Cancel(id),
            (BindingKind::Toggle, None) if rising => BindingAction::Schedule,
            _ => BindingAction::None,
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("button", &self.button)
            .field("kind", &self.kind)
            .field("was_pressed", &self.was_pressed)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
