//! Exit coordinator.
//!
//! Counts completion signals for the close attempt currently in flight and
//! reports when all of them have arrived.
//!
//! # Cycles
//!
//! ```text
//!            arm(n)                 accept x n
//!  ┌────────┐      ┌──────────────┐           ┌───────────┐
//!  │ Idle   │─────>│ Armed(c, k/n)│──────────>│ Satisfied │──> Idle
//!  └────────┘      └──────────────┘           └───────────┘
//!       ^                 │ disarm
//!       └─────────────────┘
//! ```
//!
//! Each `arm` issues a new [`CycleId`]. Signals naming any other cycle,
//! including one that was disarmed a moment ago, are stale and change nothing.
//! Satisfaction disarms the cycle, so over-delivery cannot satisfy it twice.

use std::num::NonZeroUsize;

use tracing::trace;

use crate::{
    config::SignalPolicy,
    error::ConfigError,
    signal::{CompletionSignal, CycleId},
};

/// Largest number of distinct sources a cycle can track under
/// [`SignalPolicy::PerSource`].
pub const MAX_SOURCES: usize = 64;

/// Outcome of offering a signal to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Counted; the cycle is still waiting.
    Counted {
        /// Signals received so far.
        received: usize,
        /// Signals required.
        expected: usize,
    },
    /// Counted and the cycle is now complete. Reported once per cycle.
    Satisfied,
    /// No cycle is armed.
    Idle,
    /// Names a cycle other than the armed one.
    Stale {
        /// The armed cycle.
        armed: CycleId,
    },
    /// Source already reported in this cycle.
    Duplicate,
    /// Source is not part of this cycle.
    UnknownSource,
}

impl Acceptance {
    /// True if the signal changed the received count.
    pub fn is_counted(self) -> bool {
        matches!(self, Self::Counted { .. } | Self::Satisfied)
    }
}

/// One armed close attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCycle {
    id: CycleId,
    expected: usize,
    received: usize,
    /// Bit per source that already reported (per-source policy only).
    seen: u64,
}

impl ExitCycle {
    /// Cycle identifier.
    pub fn id(&self) -> CycleId {
        self.id
    }

    /// Signals required.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Signals accepted so far.
    pub fn received(&self) -> usize {
        self.received
    }
}

/// Per-cycle completion counter.
///
/// Owns the cycle sequence, so identifiers stay unique across every arm and
/// disarm for the lifetime of the coordinator.
#[derive(Debug, Clone)]
pub struct ExitCoordinator {
    policy: SignalPolicy,
    last_issued: CycleId,
    armed: Option<ExitCycle>,
}

impl Default for ExitCoordinator {
    fn default() -> Self {
        Self::new(SignalPolicy::default())
    }
}

impl ExitCoordinator {
    /// Idle coordinator counting with `policy`.
    pub fn new(policy: SignalPolicy) -> Self {
        Self { policy, last_issued: CycleId::NONE, armed: None }
    }

    /// Counting policy.
    pub fn policy(&self) -> SignalPolicy {
        self.policy
    }

    /// Start a new cycle waiting for `expected` signals.
    ///
    /// Any cycle still armed is disarmed first; its signals become stale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooManyTransitions`] if `expected` exceeds
    /// [`MAX_SOURCES`]; such a cycle could never be satisfied. Nothing is
    /// disarmed and no id is consumed.
    pub fn arm(&mut self, expected: NonZeroUsize) -> Result<CycleId, ConfigError> {
        if expected.get() > MAX_SOURCES {
            return Err(ConfigError::TooManyTransitions { count: expected.get(), max: MAX_SOURCES });
        }
        if let Some(previous) = self.armed.take() {
            trace!(cycle = %previous.id, "replacing armed cycle");
        }
        let id = self.last_issued.next();
        self.last_issued = id;
        self.armed = Some(ExitCycle { id, expected: expected.get(), received: 0, seen: 0 });
        Ok(id)
    }

    /// Stop waiting. Returns the cycle that was armed, if any.
    pub fn disarm(&mut self) -> Option<CycleId> {
        self.armed.take().map(|cycle| cycle.id)
    }

    /// Count `signal` if it belongs to the armed cycle.
    ///
    /// Returns `true` exactly once per cycle, when the last expected signal
    /// arrives. Every other call, including ones for stale or already
    /// satisfied cycles, returns `false`.
    pub fn accept(&mut self, signal: CompletionSignal) -> bool {
        self.offer(signal) == Acceptance::Satisfied
    }

    /// Like [`Self::accept`], reporting why a signal was or was not counted.
    pub fn offer(&mut self, signal: CompletionSignal) -> Acceptance {
        let Some(cycle) = self.armed.as_mut() else {
            return Acceptance::Idle;
        };
        if signal.cycle != cycle.id {
            return Acceptance::Stale { armed: cycle.id };
        }

        if self.policy == SignalPolicy::PerSource {
            let index = signal.source.index();
            if index >= cycle.expected || index >= MAX_SOURCES {
                return Acceptance::UnknownSource;
            }
            let bit = 1u64 << index;
            if cycle.seen & bit != 0 {
                return Acceptance::Duplicate;
            }
            cycle.seen |= bit;
        }

        cycle.received += 1;
        if cycle.received == cycle.expected {
            self.armed = None;
            Acceptance::Satisfied
        } else {
            Acceptance::Counted { received: cycle.received, expected: cycle.expected }
        }
    }

    /// The armed cycle.
    pub fn armed(&self) -> Option<&ExitCycle> {
        self.armed.as_ref()
    }

    /// True while a cycle is waiting for signals.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Most recently issued cycle id, armed or not.
    pub fn last_issued(&self) -> CycleId {
        self.last_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::TransitionId;

    fn three() -> NonZeroUsize {
        NonZeroUsize::new(3).unwrap()
    }

    fn signal(cycle: CycleId, source: u8) -> CompletionSignal {
        CompletionSignal::new(cycle, TransitionId::new(source))
    }

    #[test]
    fn satisfied_after_expected_signals() {
        let mut exit = ExitCoordinator::default();
        let cycle = exit.arm(three()).unwrap();

        assert!(!exit.accept(signal(cycle, 0)));
        assert!(!exit.accept(signal(cycle, 1)));
        assert_eq!(exit.armed().map(ExitCycle::received), Some(2));
        assert!(exit.accept(signal(cycle, 2)));
        assert!(!exit.is_armed());
    }

    #[test]
    fn satisfaction_reported_once() {
        let mut exit = ExitCoordinator::new(SignalPolicy::Counted);
        let cycle = exit.arm(three()).unwrap();

        let reports = (0u8..6).filter(|&i| exit.accept(signal(cycle, i % 3))).count();
        assert_eq!(reports, 1);
    }

    #[test]
    fn idle_coordinator_ignores_signals() {
        let mut exit = ExitCoordinator::default();
        assert_eq!(exit.offer(signal(CycleId::new(1), 0)), Acceptance::Idle);
        assert!(!exit.accept(signal(CycleId::NONE, 0)));
    }

    #[test]
    fn stale_signals_discarded() {
        let mut exit = ExitCoordinator::default();
        let first = exit.arm(three()).unwrap();
        exit.disarm();
        let second = exit.arm(three()).unwrap();

        assert!(second > first);
        assert_eq!(exit.offer(signal(first, 0)), Acceptance::Stale { armed: second });
        assert_eq!(exit.armed().map(ExitCycle::received), Some(0));
    }

    #[test]
    fn disarm_returns_cycle() {
        let mut exit = ExitCoordinator::default();
        assert_eq!(exit.disarm(), None);

        let cycle = exit.arm(three()).unwrap();
        assert_eq!(exit.disarm(), Some(cycle));
        assert!(!exit.accept(signal(cycle, 0)));
    }

    #[test]
    fn per_source_discards_duplicates() {
        let mut exit = ExitCoordinator::new(SignalPolicy::PerSource);
        let cycle = exit.arm(three()).unwrap();

        assert!(exit.offer(signal(cycle, 0)).is_counted());
        assert_eq!(exit.offer(signal(cycle, 0)), Acceptance::Duplicate);
        assert_eq!(exit.offer(signal(cycle, 0)), Acceptance::Duplicate);
        assert!(!exit.accept(signal(cycle, 1)));
        assert!(exit.accept(signal(cycle, 2)));
    }

    #[test]
    fn per_source_rejects_unknown_source() {
        let mut exit = ExitCoordinator::new(SignalPolicy::PerSource);
        let cycle = exit.arm(three()).unwrap();
        assert_eq!(exit.offer(signal(cycle, 3)), Acceptance::UnknownSource);
        assert_eq!(exit.offer(signal(cycle, 200)), Acceptance::UnknownSource);
    }

    #[test]
    fn counted_policy_ignores_source_identity() {
        let mut exit = ExitCoordinator::new(SignalPolicy::Counted);
        let cycle = exit.arm(three()).unwrap();

        assert!(!exit.accept(signal(cycle, 0)));
        assert!(!exit.accept(signal(cycle, 0)));
        assert!(exit.accept(signal(cycle, 0)));
    }

    #[test]
    fn rearming_replaces_cycle() {
        let mut exit = ExitCoordinator::default();
        let first = exit.arm(three()).unwrap();
        exit.accept(signal(first, 0));

        let second = exit.arm(three()).unwrap();
        assert_eq!(exit.armed().map(ExitCycle::id), Some(second));
        assert_eq!(exit.armed().map(ExitCycle::received), Some(0));
        assert_eq!(exit.last_issued(), second);
    }

    #[test]
    fn arm_rejects_untrackable_cycle() {
        let mut exit = ExitCoordinator::default();
        let live = exit.arm(three()).unwrap();

        let too_many = NonZeroUsize::new(MAX_SOURCES + 1).unwrap();
        assert_eq!(
            exit.arm(too_many),
            Err(ConfigError::TooManyTransitions { count: MAX_SOURCES + 1, max: MAX_SOURCES })
        );
        // The armed cycle survives and no id was consumed
        assert_eq!(exit.armed().map(ExitCycle::id), Some(live));
        assert_eq!(exit.last_issued(), live);
    }

    #[test]
    fn largest_cycle_satisfied_by_every_source() {
        for policy in [SignalPolicy::PerSource, SignalPolicy::Counted] {
            let mut exit = ExitCoordinator::new(policy);
            let cycle = exit.arm(NonZeroUsize::new(MAX_SOURCES).unwrap()).unwrap();

            let satisfied =
                (0..MAX_SOURCES as u8).filter(|&source| exit.accept(signal(cycle, source))).count();
            assert_eq!(satisfied, 1, "{policy:?}");
            assert!(!exit.is_armed());
        }
    }

    #[test]
    fn single_signal_cycle() {
        let mut exit = ExitCoordinator::default();
        let cycle = exit.arm(NonZeroUsize::MIN).unwrap();
        assert_eq!(exit.offer(signal(cycle, 0)), Acceptance::Satisfied);
        assert_eq!(exit.offer(signal(cycle, 0)), Acceptance::Idle);
    }
}
