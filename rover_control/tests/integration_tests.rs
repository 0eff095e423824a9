//! Integration tests for the rover control core.
//!
//! These tests run primitives, the scheduler and the cycle runner together
//! against the simulator, covering realistic drive, alignment, binding and
//! configuration workflows.

mod integration;
