//! Menu controller state machine.
//!
//! Owns the open/closed lifecycle of the menu and decides when the host may
//! unmount it.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods take the triggering event and return `Vec<MenuAction>`
//! - No I/O, no timers, no callbacks stored inside the controller
//! - The driver executes the actions (start transitions, notify the host)
//!
//! Invalid calls are not errors. A close request while already closing, or a
//! completion signal that arrives late, returns no actions.
//!
//! # State Machine
//!
//! ```text
//!            open()                request_close()
//! ┌────────┐ ─────────> ┌──────┐ ─────────────────> ┌─────────┐
//! │ Closed │            │ Open │                    │ Closing │
//! └────────┘ <───┐      └──────┘ <───────────────── └─────────┘
//!                │                  open() (abort)       │
//!                └───────────────────────────────────────┘
//!                  all exit transitions signalled (Dismiss)
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{
    config::MenuConfig,
    error::ConfigError,
    exit::{Acceptance, ExitCoordinator, ExitCycle},
    signal::{CompletionSignal, CycleId},
};

/// Lifecycle state of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuState {
    /// Visible and idle.
    Open,
    /// Exit transitions running; waiting for their completion signals.
    Closing,
    /// Dismissed; the host has been notified.
    Closed,
}

/// What asked the menu to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseTrigger {
    /// The dismiss button inside the panel.
    CloseButton,
    /// A click on the backdrop outside the panel.
    Backdrop,
    /// The escape key.
    Escape,
}

/// Inputs to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuEvent {
    /// Show the menu.
    Open,
    /// Start closing the menu.
    Close(CloseTrigger),
    /// A visual transition finished.
    TransitionEnded(CompletionSignal),
}

/// Effects requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuAction {
    /// Run the entry transitions.
    StartEntry,

    /// Run the exit transitions. Each must report a completion signal tagged
    /// with `cycle`.
    StartExit {
        /// Close attempt the transitions belong to.
        cycle: CycleId,
    },

    /// The close attempt was cancelled; its transitions may be stopped.
    /// Signals they still send are discarded.
    AbortExit {
        /// Cancelled close attempt.
        cycle: CycleId,
    },

    /// Notify the host that the menu is fully dismissed.
    Dismiss {
        /// Close attempt that completed.
        cycle: CycleId,
    },

    /// Redraw; observable state changed.
    Render,
}

/// Receives the dismissal notification.
pub trait DismissNotifier {
    /// The menu finished closing for `cycle`.
    fn dismissed(&mut self, cycle: CycleId);
}

impl<F: FnMut(CycleId)> DismissNotifier for F {
    fn dismissed(&mut self, cycle: CycleId) {
        self(cycle);
    }
}

/// Menu controller.
///
/// One instance per menu. All cycle state is owned here, so independent
/// menus never share counters.
#[derive(Debug, Clone)]
pub struct MenuController {
    state: MenuState,
    config: MenuConfig,
    expected: NonZeroUsize,
    exit: ExitCoordinator,
    dismissals: u64,
}

impl MenuController {
    /// Create a closed menu.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`MenuConfig::validate`].
    pub fn new(config: MenuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let expected =
            NonZeroUsize::new(config.expected()).ok_or(ConfigError::NoExitTransitions)?;
        Ok(Self {
            state: MenuState::Closed,
            exit: ExitCoordinator::new(config.policy),
            expected,
            config,
            dismissals: 0,
        })
    }

    /// Current state.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// True while the menu is open and idle.
    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    /// True while exit transitions are running.
    pub fn is_closing(&self) -> bool {
        self.state == MenuState::Closing
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// The close attempt in flight, with its progress.
    pub fn active_cycle(&self) -> Option<&ExitCycle> {
        self.exit.armed()
    }

    /// `(received, expected)` of the armed cycle.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.exit.armed().map(|cycle| (cycle.received(), cycle.expected()))
    }

    /// Number of completed closes since creation.
    pub fn dismissals(&self) -> u64 {
        self.dismissals
    }

    /// Show the menu, cancelling a close in progress.
    ///
    /// No-op if already open.
    pub fn open(&mut self) -> Vec<MenuAction> {
        let mut actions = Vec::new();
        match self.state {
            MenuState::Open => {
                trace!("open ignored, already open");
                return actions;
            },
            MenuState::Closing => {
                if let Some(cycle) = self.exit.disarm() {
                    debug!(%cycle, "close aborted by reopen");
                    actions.push(MenuAction::AbortExit { cycle });
                }
            },
            MenuState::Closed => {},
        }

        debug!(from = ?self.state, "menu open");
        self.state = MenuState::Open;
        actions.push(MenuAction::StartEntry);
        actions.push(MenuAction::Render);
        actions
    }

    /// Start closing: arm a new cycle and run the exit transitions.
    ///
    /// No-op unless open, so a repeated request never resets a cycle that is
    /// already counting.
    pub fn request_close(&mut self, trigger: CloseTrigger) -> Vec<MenuAction> {
        if self.state != MenuState::Open {
            trace!(state = ?self.state, ?trigger, "close ignored");
            return Vec::new();
        }

        let cycle = match self.exit.arm(self.expected) {
            Ok(cycle) => cycle,
            Err(error) => {
                warn!(%error, ?trigger, "close ignored");
                return Vec::new();
            },
        };
        self.state = MenuState::Closing;
        debug!(%cycle, ?trigger, expected = self.expected.get(), "menu closing");
        vec![MenuAction::StartExit { cycle }, MenuAction::Render]
    }

    /// Count a completion signal; dismiss once the cycle is complete.
    pub fn handle_completion_signal(&mut self, signal: CompletionSignal) -> Vec<MenuAction> {
        if self.state != MenuState::Closing {
            trace!(state = ?self.state, cycle = %signal.cycle, "signal outside close discarded");
            return Vec::new();
        }

        match self.exit.offer(signal) {
            Acceptance::Satisfied => {
                self.state = MenuState::Closed;
                self.dismissals += 1;
                info!(cycle = %signal.cycle, "menu dismissed");
                vec![MenuAction::Dismiss { cycle: signal.cycle }, MenuAction::Render]
            },
            Acceptance::Counted { received, expected } => {
                debug!(cycle = %signal.cycle, source = %signal.source, received, expected, "signal counted");
                Vec::new()
            },
            other => {
                trace!(cycle = %signal.cycle, source = %signal.source, outcome = ?other, "signal discarded");
                Vec::new()
            },
        }
    }

    /// Dispatch `event` to the matching operation.
    pub fn handle(&mut self, event: MenuEvent) -> Vec<MenuAction> {
        match event {
            MenuEvent::Open => self.open(),
            MenuEvent::Close(trigger) => self.request_close(trigger),
            MenuEvent::TransitionEnded(signal) => self.handle_completion_signal(signal),
        }
    }

    /// Handle `event`, delivering any dismissal straight to `notifier`.
    ///
    /// Returns the remaining actions for the caller to execute.
    pub fn dispatch<N: DismissNotifier + ?Sized>(
        &mut self,
        event: MenuEvent,
        notifier: &mut N,
    ) -> Vec<MenuAction> {
        self.handle(event)
            .into_iter()
            .filter(|action| match action {
                MenuAction::Dismiss { cycle } => {
                    notifier.dismissed(*cycle);
                    false
                },
                _ => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SignalPolicy, signal::TransitionId};

    fn open_menu(policy: SignalPolicy) -> MenuController {
        let mut menu = MenuController::new(MenuConfig::with_policy(policy)).unwrap();
        menu.open();
        menu
    }

    fn signal(cycle: CycleId, source: u8) -> CompletionSignal {
        CompletionSignal::new(cycle, TransitionId::new(source))
    }

    fn closing_cycle(actions: &[MenuAction]) -> CycleId {
        match actions.first() {
            Some(MenuAction::StartExit { cycle }) => *cycle,
            other => unreachable!("expected StartExit, got {other:?}"),
        }
    }

    #[test]
    fn menu_lifecycle() {
        let mut menu = MenuController::new(MenuConfig::default()).unwrap();
        assert_eq!(menu.state(), MenuState::Closed);

        let actions = menu.open();
        assert_eq!(actions, vec![MenuAction::StartEntry, MenuAction::Render]);
        assert!(menu.is_open());

        let actions = menu.request_close(CloseTrigger::CloseButton);
        let cycle = closing_cycle(&actions);
        assert!(menu.is_closing());

        assert!(menu.handle_completion_signal(signal(cycle, 0)).is_empty());
        assert!(menu.handle_completion_signal(signal(cycle, 1)).is_empty());
        let actions = menu.handle_completion_signal(signal(cycle, 2));
        assert_eq!(actions, vec![MenuAction::Dismiss { cycle }, MenuAction::Render]);
        assert_eq!(menu.state(), MenuState::Closed);
        assert_eq!(menu.dismissals(), 1);
    }

    #[test]
    fn open_is_idempotent() {
        let mut menu = open_menu(SignalPolicy::PerSource);
        assert!(menu.open().is_empty());
        assert!(menu.is_open());
    }

    #[test]
    fn close_outside_open_is_noop() {
        let mut menu = MenuController::new(MenuConfig::default()).unwrap();
        assert!(menu.request_close(CloseTrigger::Escape).is_empty());
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(menu.active_cycle().is_none());
    }

    #[test]
    fn repeated_close_keeps_cycle() {
        let mut menu = open_menu(SignalPolicy::PerSource);
        let cycle = closing_cycle(&menu.request_close(CloseTrigger::Backdrop));
        menu.handle_completion_signal(signal(cycle, 0));

        assert!(menu.request_close(CloseTrigger::Backdrop).is_empty());
        let active = menu.active_cycle().copied().unwrap();
        assert_eq!(active.id(), cycle);
        assert_eq!(active.received(), 1);
        assert_eq!(menu.progress(), Some((1, 3)));
    }

    #[test]
    fn reopen_aborts_close() {
        let mut menu = open_menu(SignalPolicy::PerSource);
        let cycle = closing_cycle(&menu.request_close(CloseTrigger::Escape));

        let actions = menu.open();
        assert_eq!(
            actions,
            vec![MenuAction::AbortExit { cycle }, MenuAction::StartEntry, MenuAction::Render]
        );
        assert!(menu.is_open());
        assert!(menu.active_cycle().is_none());

        // Late signals from the aborted close are ignored while open
        assert!(menu.handle_completion_signal(signal(cycle, 0)).is_empty());

        // And do not count towards the next close
        let next = closing_cycle(&menu.request_close(CloseTrigger::Escape));
        assert!(next > cycle);
        for source in 0..3 {
            assert!(menu.handle_completion_signal(signal(cycle, source)).is_empty());
        }
        assert_eq!(menu.active_cycle().map(ExitCycle::received), Some(0));
    }

    #[test]
    fn signals_after_dismiss_ignored() {
        let mut menu = open_menu(SignalPolicy::Counted);
        let cycle = closing_cycle(&menu.request_close(CloseTrigger::CloseButton));
        for source in 0..3 {
            menu.handle_completion_signal(signal(cycle, source));
        }
        assert_eq!(menu.state(), MenuState::Closed);

        assert!(menu.handle_completion_signal(signal(cycle, 0)).is_empty());
        assert_eq!(menu.dismissals(), 1);
    }

    #[test]
    fn dispatch_notifies_once() {
        let mut menu = open_menu(SignalPolicy::PerSource);
        let mut notified = Vec::new();
        let mut notifier = |cycle: CycleId| notified.push(cycle);

        let actions = menu.dispatch(MenuEvent::Close(CloseTrigger::Backdrop), &mut notifier);
        let cycle = closing_cycle(&actions);

        for source in [2, 0, 0, 1, 1, 2] {
            let rest = menu.dispatch(MenuEvent::TransitionEnded(signal(cycle, source)), &mut notifier);
            assert!(!rest.iter().any(|action| matches!(action, MenuAction::Dismiss { .. })));
        }

        assert_eq!(notified, vec![cycle]);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MenuConfig { exit: crate::Timeline::default(), ..MenuConfig::default() };
        assert_eq!(MenuController::new(config).unwrap_err(), ConfigError::NoExitTransitions);
    }
}
