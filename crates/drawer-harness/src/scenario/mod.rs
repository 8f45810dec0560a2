//! Scenario testing with mandatory oracles.
//!
//! A scenario scripts user input against a simulated visual layer, runs it to
//! quiescence, and hands the final [`World`] to an oracle. Building a
//! runnable scenario without an oracle is impossible.

mod builder;
pub mod oracle;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::World;

/// Verification function run against the final world.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
