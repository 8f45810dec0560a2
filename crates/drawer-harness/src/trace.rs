//! Recorded menu event traces.
//!
//! A [`Trace`] is the exact sequence of menu events a simulation delivered,
//! with their virtual times. Traces encode to CBOR so a failing run can be
//! saved and replayed against a fresh controller without the simulator.

use std::time::Duration;

use drawer_core::{ConfigError, MenuAction, MenuConfig, MenuController, MenuEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from encoding, decoding, or replaying a trace.
#[derive(Error, Debug)]
pub enum TraceError {
    /// CBOR encoding failed.
    #[error("failed to encode trace: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("failed to decode trace: {0}")]
    Decode(String),

    /// The replay configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One delivered menu event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Virtual time of delivery, in microseconds.
    pub at_micros: u64,
    /// The event.
    pub event: MenuEvent,
}

impl TraceEntry {
    /// Virtual time of delivery.
    pub fn at(&self) -> Duration {
        Duration::from_micros(self.at_micros)
    }
}

/// Ordered menu events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    /// Append `event` delivered at `at`.
    pub fn push(&mut self, at: Duration, event: MenuEvent) {
        self.entries.push(TraceEntry { at_micros: at.as_micros() as u64, event });
    }

    /// Entries in delivery order.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as CBOR.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Encode`] if serialization fails.
    pub fn to_cbor(&self) -> Result<Vec<u8>, TraceError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| TraceError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Decode`] if `bytes` is not an encoded trace.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, TraceError> {
        ciborium::from_reader(bytes).map_err(|e| TraceError::Decode(e.to_string()))
    }

    /// Feed every event into a fresh controller.
    ///
    /// Returns the controller and all actions it produced, in order.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Config`] if `config` is invalid.
    pub fn replay(&self, config: MenuConfig) -> Result<(MenuController, Vec<MenuAction>), TraceError> {
        let mut menu = MenuController::new(config)?;
        let actions = self.entries.iter().flat_map(|entry| menu.handle(entry.event)).collect();
        Ok((menu, actions))
    }
}
