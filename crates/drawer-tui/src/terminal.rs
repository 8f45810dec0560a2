//! Terminal driver.
//!
//! Implements [`Driver`] over crossterm and ratatui. Exit transitions run as
//! tokio tasks that sleep for the transition's delay and duration and then
//! send a [`CompletionSignal`] back over a channel, so completions arrive as
//! ordinary events next to keyboard input and frame ticks.
//!
//! Terminal state is restored on:
//! - normal exit ([`Driver::stop`])
//! - early return (via Drop)
//! - panic ([`install_panic_hook`])

use std::{
    io::{self, Stdout},
    panic,
    time::{Duration, Instant},
};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use drawer_app::{AppEvent, Driver};
use drawer_core::{CompletionSignal, CycleId, MenuController, Timeline, TransitionId};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    input,
    ui::{self, Animation, View},
};

/// Terminal driver errors.
#[derive(Error, Debug)]
pub enum TerminalError {
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver options.
#[derive(Debug, Clone)]
pub struct TerminalOptions {
    /// Redraw interval while running.
    pub frame_interval: Duration,
    /// Exit transitions whose runner never reports completion.
    pub dropped: Vec<TransitionId>,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self { frame_interval: Duration::from_millis(33), dropped: Vec::new() }
    }
}

/// Driver rendering to the real terminal.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
    signal_tx: mpsc::UnboundedSender<CompletionSignal>,
    signal_rx: mpsc::UnboundedReceiver<CompletionSignal>,
    frames: Interval,
    dropped: Vec<TransitionId>,
    view: View,
    area: Rect,
    restored: bool,
}

impl TerminalDriver {
    /// Take over the terminal.
    ///
    /// Must be called inside a tokio runtime. Call [`install_panic_hook`]
    /// first so a panic still restores the terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Io`] if the terminal cannot be set up.
    pub fn new(options: TerminalOptions) -> Result<Self, TerminalError> {
        let terminal = setup_terminal()?;
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        let mut frames = tokio::time::interval(options.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Ok(Self {
            terminal,
            events: EventStream::new(),
            signal_tx,
            signal_rx,
            frames,
            dropped: options.dropped,
            view: View::default(),
            area: Rect::default(),
            restored: false,
        })
    }

    fn map_event(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) => input::map_key(key),
            Event::Mouse(mouse) => input::map_mouse(mouse, self.area),
            Event::Resize(..) => Some(AppEvent::Tick),
            _ => None,
        }
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(error) = restore_terminal() {
            warn!(%error, "failed to restore terminal");
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_events(&mut self) -> Result<Vec<AppEvent>, Self::Error> {
        tokio::select! {
            event = self.events.next() => match event {
                Some(Ok(event)) => Ok(self.map_event(event).into_iter().collect()),
                Some(Err(error)) => Err(TerminalError::Io(error)),
                None => Ok(vec![AppEvent::Quit]),
            },
            // The driver keeps a sender, so the channel never closes
            Some(signal) = self.signal_rx.recv() => Ok(vec![signal.into()]),
            _ = self.frames.tick() => Ok(vec![AppEvent::Tick]),
        }
    }

    fn start_entry(&mut self, _timeline: &Timeline) -> Result<(), Self::Error> {
        self.view.animation = Animation::Entry { started: Instant::now() };
        Ok(())
    }

    fn start_exit(&mut self, cycle: CycleId, timeline: &Timeline) -> Result<(), Self::Error> {
        self.view.animation = Animation::Exit { cycle, started: Instant::now() };

        let runners = spawn_runners(cycle, timeline, &self.dropped, &self.signal_tx);
        debug!(%cycle, runners, "exit started");
        Ok(())
    }

    fn abort_exit(&mut self, cycle: CycleId) {
        // Runners keep going; their signals will be stale
        debug!(%cycle, "exit aborted");
    }

    fn dismissed(&mut self, cycle: CycleId) -> Result<(), Self::Error> {
        info!(%cycle, "menu dismissed");
        self.view.animation = Animation::Idle;
        self.view.last_dismissed = Some(cycle);
        Ok(())
    }

    fn render(&mut self, menu: &MenuController) -> Result<(), Self::Error> {
        let now = Instant::now();
        let view = &self.view;
        let frame = self.terminal.draw(|frame| ui::draw(frame, menu, view, now))?;
        self.area = frame.area;
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Start one timer task per exit transition in `timeline`, except those in
/// `dropped`. Each task sleeps for the transition's delay and duration, then
/// sends its completion signal tagged with `cycle`.
///
/// Returns the number of runners started. Must be called inside a tokio
/// runtime.
pub fn spawn_runners(
    cycle: CycleId,
    timeline: &Timeline,
    dropped: &[TransitionId],
    tx: &mpsc::UnboundedSender<CompletionSignal>,
) -> usize {
    let mut runners = 0;
    for spec in timeline {
        if dropped.contains(&spec.id) {
            warn!(%cycle, transition = %spec.name, "transition runner disabled");
            continue;
        }

        let signal = CompletionSignal::new(cycle, spec.id);
        let after = spec.end();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver is gone once the driver has been dropped
            let _ = tx.send(signal);
        });
        runners += 1;
    }
    runners
}

/// Enable raw mode, enter the alternate screen and capture the mouse.
///
/// # Errors
///
/// Returns an error if any terminal command fails.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TerminalError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Undo [`setup_terminal`]. Safe to call more than once.
///
/// # Errors
///
/// Returns an error if leaving the alternate screen or raw mode fails.
pub fn restore_terminal() -> Result<(), TerminalError> {
    // Mouse capture must go before raw mode
    let _ = execute!(io::stdout(), DisableMouseCapture);
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Restore the terminal before the default panic output is printed.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
