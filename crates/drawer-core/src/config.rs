//! Controller configuration.

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, exit::MAX_SOURCES, timeline::Timeline};

/// How completion signals are counted within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalPolicy {
    /// Each transition counts at most once per cycle. A second signal from
    /// the same transition is discarded, so a runner that double-fires cannot
    /// stand in for one that has not finished yet.
    #[default]
    PerSource,
    /// Every signal for the armed cycle counts, whatever its source. Three
    /// signals satisfy a cycle of three even if one transition sent them all.
    Counted,
}

/// Menu controller configuration.
///
/// The number of completion signals a close waits for is the length of the
/// exit timeline. It is fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Transitions run while closing; each reports one completion signal.
    pub exit: Timeline,
    /// Transitions run while opening; never counted.
    pub entry: Timeline,
    /// Counting policy for completion signals.
    pub policy: SignalPolicy,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            exit: Timeline::exit_default(),
            entry: Timeline::entry_default(),
            policy: SignalPolicy::default(),
        }
    }
}

impl MenuConfig {
    /// Default timelines with `policy`.
    pub fn with_policy(policy: SignalPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Completion signals required to finish a close.
    pub fn expected(&self) -> usize {
        self.exit.len()
    }

    /// Check the configuration can ever complete a close.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoExitTransitions`] if the exit timeline is empty
    /// - [`ConfigError::TooManyTransitions`] if it exceeds [`MAX_SOURCES`]
    /// - [`ConfigError::MisorderedTransition`] if an id differs from its
    ///   position
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exit.is_empty() {
            return Err(ConfigError::NoExitTransitions);
        }
        if self.exit.len() > MAX_SOURCES {
            return Err(ConfigError::TooManyTransitions { count: self.exit.len(), max: MAX_SOURCES });
        }
        for (position, spec) in self.exit.iter().enumerate() {
            if spec.id.index() != position {
                return Err(ConfigError::MisorderedTransition { position, id: spec.id });
            }
        }
        Ok(())
    }
}
