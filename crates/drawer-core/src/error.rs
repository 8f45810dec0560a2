//! Error types for drawer configuration.

use thiserror::Error;

use crate::signal::TransitionId;

/// Configuration rejected by [`crate::MenuConfig::validate`].
///
/// Runtime operations never fail: invalid calls degrade to no-ops. Only the
/// fixed configuration can be wrong, and it is checked once up front.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The exit timeline is empty, so no close could ever complete.
    #[error("exit timeline has no transitions")]
    NoExitTransitions,

    /// More exit transitions than a cycle can track.
    #[error("exit timeline has {count} transitions, at most {max} are supported")]
    TooManyTransitions {
        /// Configured transition count.
        count: usize,
        /// Supported maximum.
        max: usize,
    },

    /// Transition ids must match their position in the timeline.
    #[error("transition at position {position} has id {id}")]
    MisorderedTransition {
        /// Position inside the timeline.
        position: usize,
        /// Id found at that position.
        id: TransitionId,
    },
}
