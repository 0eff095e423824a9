//! # Rover Control Library
//!
//! Periodic closed-loop control core for a two-wheel-drive rover. Discrete
//! intents (drive forward half a metre, turn 90°, square up against a wall,
//! spin the feeder two rotations) become per-tick actuator outputs through
//! encoder and range feedback, PID loops and a safety bounding layer.
//!
//! ## Layers
//!
//! 1. **control**: PID controller and arcade mixing math
//! 2. **safety**: output sanitizing, sentinel sensors, timeouts, warn latches
//! 3. **subsystem**: drivetrain, rollers and range sensors over the HAL traits
//! 4. **primitive**: motion primitives implementing the `Command` lifecycle
//! 5. **command**: the cooperative scheduler, trigger bindings, composition
//! 6. **cycle**: fixed-period runner owning the scheduler and robot mode
//!
//! ## Single-Threaded Tick
//!
//! Everything runs inside one `tick` on the caller's thread. Tables are
//! sized at registration time and primitives never sleep; timeouts are
//! tick counts or elapsed-time checks against the injected clock.

pub mod command;
pub mod control;
pub mod cycle;
pub mod error;
pub mod primitive;
pub mod routine;
pub mod safety;
pub mod sim;
pub mod subsystem;
