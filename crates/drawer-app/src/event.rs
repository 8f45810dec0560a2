//! Application events
//!
//! Everything a driver can hand to the runtime.

use drawer_core::{CompletionSignal, MenuEvent};

/// Input collected by a [`crate::Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Input for the menu state machine.
    Menu(MenuEvent),

    /// Animation frame; redraw without changing state.
    Tick,

    /// Stop the runtime.
    Quit,
}

impl From<MenuEvent> for AppEvent {
    fn from(event: MenuEvent) -> Self {
        Self::Menu(event)
    }
}

impl From<CompletionSignal> for AppEvent {
    fn from(signal: CompletionSignal) -> Self {
        Self::Menu(MenuEvent::TransitionEnded(signal))
    }
}
