//! Application layer for the drawer
//!
//! Generic runtime that feeds input into the pure menu state machine and
//! hands the resulting actions to a platform driver, so the same
//! orchestration runs in the terminal frontend and in tests.
//!
//! # Components
//!
//! - [`AppEvent`]: Inputs collected by a driver (menu events, ticks, quit)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

mod driver;
mod event;
mod runtime;

pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
