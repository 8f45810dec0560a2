//! Reference model for model-based testing.
//!
//! [`ModelMenu`] is the simplest thing that could describe correct dismissal
//! behaviour: plain fields, a set of sources seen, no actions. Property tests
//! drive it and the real [`drawer_core::MenuController`] with the same
//! [`Operation`]s and require identical observable outcomes.

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use drawer_core::{CompletionSignal, CycleId, MenuState, SignalPolicy, TransitionId};

/// One step of a generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Open request.
    Open,
    /// Close request.
    Close,
    /// Completion signal for a recent cycle.
    Signal {
        /// How many cycles back from the most recently issued one; `0` is the
        /// latest, larger values produce stale signals.
        age: u8,
        /// Reporting transition.
        source: u8,
    },
}

/// Observable result of applying an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// State after the operation.
    pub state: MenuState,
    /// Cycle dismissed by this operation, if any.
    pub dismissed: Option<CycleId>,
}

/// Reference menu.
#[derive(Debug, Clone)]
pub struct ModelMenu {
    expected: usize,
    policy: SignalPolicy,
    state: MenuState,
    issued: u64,
    armed: Option<u64>,
    seen: BTreeSet<u8>,
    received: usize,
    dismissed: Vec<CycleId>,
}

impl ModelMenu {
    /// Closed menu waiting for `expected` signals per close.
    pub fn new(expected: usize, policy: SignalPolicy) -> Self {
        Self {
            expected,
            policy,
            state: MenuState::Closed,
            issued: 0,
            armed: None,
            seen: BTreeSet::new(),
            received: 0,
            dismissed: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Signals counted in the armed cycle.
    pub fn received(&self) -> Option<usize> {
        self.armed.map(|_| self.received)
    }

    /// Every dismissed cycle, in order.
    pub fn dismissed(&self) -> &[CycleId] {
        &self.dismissed
    }

    /// Cycle id `age` cycles before the latest issued one.
    pub fn cycle_for_age(&self, age: u8) -> CycleId {
        CycleId::new(self.issued.saturating_sub(u64::from(age)))
    }

    /// The completion signal an operation denotes, if it is one.
    pub fn signal_for(&self, op: &Operation) -> Option<CompletionSignal> {
        match *op {
            Operation::Signal { age, source } => {
                Some(CompletionSignal::new(self.cycle_for_age(age), TransitionId::new(source)))
            },
            Operation::Open | Operation::Close => None,
        }
    }

    /// Apply `op`.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        let mut dismissed = None;
        match *op {
            Operation::Open => {
                self.armed = None;
                self.state = MenuState::Open;
            },
            Operation::Close => {
                if self.state == MenuState::Open {
                    self.issued += 1;
                    self.armed = Some(self.issued);
                    self.seen.clear();
                    self.received = 0;
                    self.state = MenuState::Closing;
                }
            },
            Operation::Signal { age, source } => {
                let cycle = self.cycle_for_age(age).get();
                if self.state == MenuState::Closing && self.armed == Some(cycle) {
                    let counts = match self.policy {
                        SignalPolicy::PerSource => {
                            usize::from(source) < self.expected && self.seen.insert(source)
                        },
                        SignalPolicy::Counted => true,
                    };
                    if counts {
                        self.received += 1;
                        if self.received == self.expected {
                            self.armed = None;
                            self.state = MenuState::Closed;
                            self.dismissed.push(CycleId::new(cycle));
                            dismissed = Some(CycleId::new(cycle));
                        }
                    }
                }
            },
        }
        Outcome { state: self.state, dismissed }
    }
}
