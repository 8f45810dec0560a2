//! Identifiers and completion signals.
//!
//! Every close attempt gets a fresh [`CycleId`]. Visual transitions report back
//! with a [`CompletionSignal`] that names both the cycle they were started for
//! and which transition finished, so late reports from an abandoned close can
//! be told apart from the current one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one close attempt.
///
/// Issued in strictly increasing order by [`crate::ExitCoordinator::arm`].
/// [`CycleId::NONE`] is never issued and precedes every real cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(u64);

impl CycleId {
    /// Placeholder preceding the first issued cycle.
    pub const NONE: Self = Self(0);

    /// Wrap a raw cycle number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw cycle number.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier issued after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of a transition inside the exit timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(u8);

impl TransitionId {
    /// Wrap a raw transition index.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Index into the timeline.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A visual transition finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionSignal {
    /// Close attempt the transition was started for.
    pub cycle: CycleId,
    /// Which transition finished.
    pub source: TransitionId,
}

impl CompletionSignal {
    /// Signal for `source` finishing during `cycle`.
    pub const fn new(cycle: CycleId, source: TransitionId) -> Self {
        Self { cycle, source }
    }
}
