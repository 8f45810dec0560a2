//! Virtual-time driver.
//!
//! [`SimDriver`] stands in for the visual layer. Starting the exit
//! transitions schedules one completion signal per transition at
//! `now + delay + duration + jitter`; user input is scheduled explicitly.
//! Polling pops the earliest scheduled batch and advances the clock to it, so
//! a whole close plays out instantly and identically for a given seed.
//!
//! Aborted closes are not cancelled here. Their signals still fire, late,
//! which is exactly what a real visual layer does when the menu is reopened
//! mid-animation.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    convert::Infallible,
    time::Duration,
};

use drawer_app::{AppEvent, Driver, Runtime};
use drawer_core::{
    CompletionSignal, ConfigError, CycleId, MenuConfig, MenuController, Timeline, TransitionId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::trace::Trace;

/// Misbehaviour injected into the simulated visual layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    /// Transitions that never report completion.
    pub dropped: Vec<TransitionId>,
    /// Transitions that report completion twice.
    pub duplicated: Vec<TransitionId>,
    /// Transitions that report late by the given amount.
    pub delayed: Vec<(TransitionId, Duration)>,
}

impl Faults {
    /// Well-behaved visual layer.
    pub fn none() -> Self {
        Self::default()
    }

    /// Never report `id`.
    #[must_use]
    pub fn drop_transition(mut self, id: u8) -> Self {
        self.dropped.push(TransitionId::new(id));
        self
    }

    /// Report `id` twice.
    #[must_use]
    pub fn duplicate_transition(mut self, id: u8) -> Self {
        self.duplicated.push(TransitionId::new(id));
        self
    }

    /// Report `id` late by `by`.
    #[must_use]
    pub fn delay_transition(mut self, id: u8, by: Duration) -> Self {
        self.delayed.push((TransitionId::new(id), by));
        self
    }

    fn extra_delay(&self, id: TransitionId) -> Duration {
        self.delayed.iter().filter(|(fault, _)| *fault == id).map(|(_, by)| *by).sum()
    }
}

/// An event waiting for its virtual time.
#[derive(Debug)]
struct Scheduled {
    at: Duration,
    seq: u64,
    event: AppEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// Deterministic virtual-time driver.
#[derive(Debug)]
pub struct SimDriver {
    now: Duration,
    rng: ChaCha8Rng,
    jitter: Duration,
    faults: Faults,
    queue: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
    trace: Trace,
    exits: Vec<(CycleId, Duration)>,
    dismissals: Vec<(CycleId, Duration)>,
    aborted: Vec<CycleId>,
    entries: usize,
    renders: usize,
    stopped: bool,
}

impl SimDriver {
    /// Driver at virtual time zero with no jitter and no faults.
    pub fn new(seed: u64) -> Self {
        Self {
            now: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed),
            jitter: Duration::ZERO,
            faults: Faults::none(),
            queue: BinaryHeap::new(),
            seq: 0,
            trace: Trace::default(),
            exits: Vec::new(),
            dismissals: Vec::new(),
            aborted: Vec::new(),
            entries: 0,
            renders: 0,
            stopped: false,
        }
    }

    /// Delay each completion by up to `jitter`, drawn from the seeded RNG.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Inject `faults` into every exit.
    #[must_use]
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Deliver `event` at virtual time `at` (clamped to now).
    pub fn schedule(&mut self, at: Duration, event: impl Into<AppEvent>) {
        let at = at.max(self.now);
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Reverse(Scheduled { at, seq, event: event.into() }));
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time of the next scheduled event.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(next)| next.at)
    }

    /// Number of scheduled events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Move the clock forward without delivering anything.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    /// Pop every event due at the earliest scheduled time and advance to it.
    ///
    /// Empty once nothing is scheduled.
    pub fn next_batch(&mut self) -> Vec<AppEvent> {
        let Some(at) = self.next_due() else {
            return Vec::new();
        };
        self.now = at;

        let mut batch = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.at != at {
                break;
            }
            if let Some(Reverse(next)) = self.queue.pop() {
                if let AppEvent::Menu(event) = next.event {
                    self.trace.push(at, event);
                }
                batch.push(next.event);
            }
        }
        trace!(at = ?self.now, events = batch.len(), "delivering batch");
        batch
    }

    /// Every close started, with its start time.
    pub fn exits_started(&self) -> &[(CycleId, Duration)] {
        &self.exits
    }

    /// Every dismissal notification, with its time.
    pub fn dismissals(&self) -> &[(CycleId, Duration)] {
        &self.dismissals
    }

    /// Cancelled closes.
    pub fn aborted(&self) -> &[CycleId] {
        &self.aborted
    }

    /// Number of entry animations started.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Number of renders requested.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// True once the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Menu events in delivery order.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    fn sample_jitter(&mut self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let max = self.jitter.as_micros() as u64;
        Duration::from_micros(self.rng.gen_range(0..=max))
    }
}

impl Driver for SimDriver {
    type Error = Infallible;

    async fn poll_events(&mut self) -> Result<Vec<AppEvent>, Self::Error> {
        let batch = self.next_batch();
        if batch.is_empty() { Ok(vec![AppEvent::Quit]) } else { Ok(batch) }
    }

    fn start_entry(&mut self, _timeline: &Timeline) -> Result<(), Self::Error> {
        self.entries += 1;
        Ok(())
    }

    fn start_exit(&mut self, cycle: CycleId, timeline: &Timeline) -> Result<(), Self::Error> {
        self.exits.push((cycle, self.now));

        for spec in timeline {
            if self.faults.dropped.contains(&spec.id) {
                debug!(%cycle, transition = %spec.name, "transition dropped");
                continue;
            }

            let at = self.now + spec.end() + self.sample_jitter() + self.faults.extra_delay(spec.id);
            self.schedule(at, CompletionSignal::new(cycle, spec.id));

            if self.faults.duplicated.contains(&spec.id) {
                let again = at + self.sample_jitter();
                debug!(%cycle, transition = %spec.name, "transition duplicated");
                self.schedule(again, CompletionSignal::new(cycle, spec.id));
            }
        }
        Ok(())
    }

    fn abort_exit(&mut self, cycle: CycleId) {
        self.aborted.push(cycle);
    }

    fn dismissed(&mut self, cycle: CycleId) -> Result<(), Self::Error> {
        self.dismissals.push((cycle, self.now));
        Ok(())
    }

    fn render(&mut self, _menu: &MenuController) -> Result<(), Self::Error> {
        self.renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// A menu controller wired to a [`SimDriver`], stepped synchronously.
pub struct Simulation {
    runtime: Runtime<SimDriver>,
}

impl Simulation {
    /// Build a simulation.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if `config` is invalid.
    pub fn new(config: MenuConfig, driver: SimDriver) -> Result<Self, ConfigError> {
        let menu = MenuController::new(config)?;
        Ok(Self { runtime: Runtime::new(driver, menu) })
    }

    /// Deliver `event` at `at`.
    pub fn schedule(&mut self, at: Duration, event: impl Into<AppEvent>) {
        self.runtime.driver_mut().schedule(at, event);
    }

    /// Deliver the next batch. Returns `false` once nothing is scheduled.
    pub fn step(&mut self) -> bool {
        let batch = self.runtime.driver_mut().next_batch();
        if batch.is_empty() {
            return false;
        }
        for event in batch {
            let Ok(()) = self.runtime.process(event);
        }
        true
    }

    /// Run until nothing is scheduled.
    pub fn run(&mut self) {
        while self.step() {}
    }

    /// Run every event due up to and including `at`, then move the clock to
    /// `at`.
    pub fn run_until(&mut self, at: Duration) {
        while self.runtime.driver().next_due().is_some_and(|due| due <= at) {
            self.step();
        }
        self.runtime.driver_mut().advance_to(at);
    }

    /// The menu state machine.
    pub fn menu(&self) -> &MenuController {
        self.runtime.menu()
    }

    /// The simulated driver.
    pub fn driver(&self) -> &SimDriver {
        self.runtime.driver()
    }

    /// Consume the simulation.
    pub fn into_parts(self) -> (SimDriver, MenuController) {
        self.runtime.into_parts()
    }
}

#[cfg(test)]
mod tests {
    use drawer_core::{CloseTrigger, MenuEvent, MenuState};

    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn batches_pop_in_time_order() {
        let mut driver = SimDriver::new(1);
        driver.schedule(ms(20), AppEvent::Tick);
        driver.schedule(ms(10), MenuEvent::Open);
        driver.schedule(ms(20), AppEvent::Quit);

        assert_eq!(driver.next_batch(), vec![AppEvent::Menu(MenuEvent::Open)]);
        assert_eq!(driver.now(), ms(10));
        assert_eq!(driver.next_batch(), vec![AppEvent::Tick, AppEvent::Quit]);
        assert!(driver.next_batch().is_empty());
        assert_eq!(driver.trace().len(), 1);
    }

    #[test]
    fn past_events_clamped_to_now() {
        let mut driver = SimDriver::new(1);
        driver.advance_to(ms(50));
        driver.schedule(ms(10), AppEvent::Tick);
        assert_eq!(driver.next_due(), Some(ms(50)));
    }

    #[test]
    fn default_close_settles_at_900ms() {
        let mut sim = Simulation::new(MenuConfig::default(), SimDriver::new(7)).unwrap();
        sim.schedule(ms(0), MenuEvent::Open);
        sim.schedule(ms(100), MenuEvent::Close(CloseTrigger::Backdrop));

        sim.run_until(ms(999));
        assert_eq!(sim.menu().state(), MenuState::Closing);

        sim.run();
        assert_eq!(sim.menu().state(), MenuState::Closed);
        assert_eq!(sim.driver().dismissals(), &[(CycleId::new(1), ms(1000))]);
    }

    #[test]
    fn jitter_is_deterministic_per_seed() {
        let run = |seed| {
            let driver = SimDriver::new(seed).with_jitter(ms(50));
            let mut sim = Simulation::new(MenuConfig::default(), driver).unwrap();
            sim.schedule(ms(0), MenuEvent::Open);
            sim.schedule(ms(0), MenuEvent::Close(CloseTrigger::Escape));
            sim.run();
            sim.driver().dismissals().to_vec()
        };

        assert_eq!(run(42), run(42));
        let (_, at) = run(42)[0];
        assert!(at >= ms(900) && at <= ms(950), "dismissed at {at:?}");
    }

    #[test]
    fn dropped_transition_never_dismisses() {
        let driver = SimDriver::new(3).with_faults(Faults::none().drop_transition(1));
        let mut sim = Simulation::new(MenuConfig::default(), driver).unwrap();
        sim.schedule(ms(0), MenuEvent::Open);
        sim.schedule(ms(0), MenuEvent::Close(CloseTrigger::CloseButton));
        sim.run();

        assert_eq!(sim.menu().state(), MenuState::Closing);
        assert!(sim.driver().dismissals().is_empty());
    }
}
