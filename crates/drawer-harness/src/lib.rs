//! Deterministic simulation harness for drawer testing.
//!
//! Virtual-time implementation of the [`drawer_app::Driver`] trait: exit
//! transitions finish after their configured delay and duration plus seeded
//! jitter, and can be dropped, duplicated, or held back to reproduce
//! misbehaving visual layers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod scenario;
pub mod sim_driver;
pub mod trace;

pub use model::{ModelMenu, Operation, Outcome};
pub use sim_driver::{Faults, SimDriver, Simulation};
pub use trace::{Trace, TraceEntry, TraceError};
