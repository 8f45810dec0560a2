//! Terminal UI for the drawer
//!
//! A thin shell over [`drawer_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`drawer_app::Runtime`].

pub mod input;
pub mod terminal;
pub mod ui;

pub use drawer_app::{AppEvent, Driver, Runtime};
pub use terminal::{TerminalDriver, TerminalError, TerminalOptions};
pub use ui::{Animation, View};
