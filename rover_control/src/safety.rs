//! Safety layer root.
//!
//! Guards applied at every actuator write and every sensor consumption
//! site, plus the per-instance timeout and warning state used by the
//! primitives.

pub mod latch;
pub mod output;
pub mod sensor;
pub mod timeout;
