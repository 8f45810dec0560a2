//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific input, transition runners, and rendering, while the
//! generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use drawer_core::{CycleId, MenuController, Timeline};

use crate::AppEvent;

/// Abstracts I/O operations for the application runtime.
///
/// Transition runners started by [`Driver::start_exit`] report back through
/// [`Driver::poll_events`] as [`AppEvent::Menu`] completion signals tagged with
/// the cycle they were started for.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for input and return events to process.
    ///
    /// May return an empty vector; the runtime polls again.
    fn poll_events(&mut self) -> impl Future<Output = Result<Vec<AppEvent>, Self::Error>> + Send;

    /// Run the entry transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the transitions cannot be started.
    fn start_entry(&mut self, timeline: &Timeline) -> Result<(), Self::Error>;

    /// Run the exit transitions for `cycle`.
    ///
    /// Every transition in `timeline` must eventually produce one completion
    /// signal carrying `cycle` and its own id.
    ///
    /// # Errors
    ///
    /// Returns an error if the transitions cannot be started. The controller
    /// has already moved to `Closing` with `cycle` armed and is not rolled
    /// back, so the menu stays closing until it is reopened.
    fn start_exit(&mut self, cycle: CycleId, timeline: &Timeline) -> Result<(), Self::Error>;

    /// The close attempt `cycle` was cancelled.
    ///
    /// Stopping the runners is optional; their late signals are discarded.
    fn abort_exit(&mut self, cycle: CycleId);

    /// The menu is fully dismissed. Called once per completed close.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the notification.
    fn dismissed(&mut self, cycle: CycleId) -> Result<(), Self::Error>;

    /// Render the menu.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, menu: &MenuController) -> Result<(), Self::Error>;

    /// Release platform resources.
    fn stop(&mut self);
}
