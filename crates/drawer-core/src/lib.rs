//! Drawer core logic
//!
//! Pure state machines that decide when a slide-out menu is fully dismissed,
//! completely decoupled from rendering, timers, and I/O.
//!
//! # Architecture
//!
//! The menu is closed by several visual exit transitions that run
//! concurrently and finish at independent times. The host must only be told
//! the menu is gone once every one of them has finished. This crate models
//! that as deterministic state machines driven by explicit events:
//!
//! - an open request
//! - a close request
//! - a completion signal tagged with the close attempt it belongs to
//!
//! State transitions produce declarative [`menu::MenuAction`]s that describe
//! intended effects (start the exit transitions, notify the host) rather than
//! executing them. A runtime, frontend, or test harness interprets them.
//!
//! # Components
//!
//! - [`exit`]: Exit coordinator (per-cycle signal counting)
//! - [`menu`]: Menu controller (open/closing/closed lifecycle)
//! - [`timeline`]: Transition specs and default exit/entry timelines
//! - [`config`]: Controller configuration and signal policy
//! - [`signal`]: Cycle and transition identifiers, completion signals
//! - [`error`]: Configuration errors

pub mod config;
pub mod error;
pub mod exit;
pub mod menu;
pub mod signal;
pub mod timeline;

pub use config::{MenuConfig, SignalPolicy};
pub use error::ConfigError;
pub use exit::{Acceptance, ExitCoordinator, ExitCycle};
pub use menu::{CloseTrigger, DismissNotifier, MenuAction, MenuController, MenuEvent, MenuState};
pub use signal::{CompletionSignal, CycleId, TransitionId};
pub use timeline::{Easing, Effect, Timeline, TransitionSpec};
