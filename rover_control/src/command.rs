//! Command lifecycle root.
//!
//! The [`lifecycle::Command`] trait, the cooperative [`scheduler`] that
//! arbitrates actuator ownership every tick, operator trigger [`binding`]s
//! and sequential composition in [`group`].

pub mod binding;
pub mod group;
pub mod lifecycle;
pub mod scheduler;
