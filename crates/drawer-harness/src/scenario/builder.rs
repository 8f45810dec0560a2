//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use std::time::Duration;

use drawer_core::{CloseTrigger, CompletionSignal, CycleId, MenuConfig, MenuEvent, TransitionId};

use crate::{
    scenario::{OracleFn, World},
    sim_driver::{Faults, SimDriver, Simulation},
};

/// Scenario builder.
///
/// Script user input and stray signals at virtual times, configure the
/// simulated visual layer, then call `.oracle()` to get a
/// [`RunnableScenario`].
pub struct Scenario {
    name: String,
    config: MenuConfig,
    seed: u64,
    jitter: Duration,
    faults: Faults,
    inputs: Vec<(Duration, MenuEvent)>,
}

impl Scenario {
    /// Create a new scenario with the given name.
    ///
    /// Defaults: default menu configuration, seed 0, no jitter, no faults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: MenuConfig::default(),
            seed: 0,
            jitter: Duration::ZERO,
            faults: Faults::none(),
            inputs: Vec::new(),
        }
    }

    /// Use `config` for the controller.
    pub fn config(mut self, config: MenuConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed for completion jitter.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Delay each completion by up to `jitter`.
    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Inject faults into the visual layer.
    pub fn faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Open request at `at_ms`.
    pub fn open_at(self, at_ms: u64) -> Self {
        self.input(at_ms, MenuEvent::Open)
    }

    /// Close request at `at_ms`.
    pub fn close_at(self, at_ms: u64) -> Self {
        self.input(at_ms, MenuEvent::Close(CloseTrigger::CloseButton))
    }

    /// Completion signal from outside the visual layer at `at_ms`.
    pub fn signal_at(self, at_ms: u64, cycle: u64, source: u8) -> Self {
        let signal = CompletionSignal::new(CycleId::new(cycle), TransitionId::new(source));
        self.input(at_ms, MenuEvent::TransitionEnded(signal))
    }

    /// Arbitrary menu event at `at_ms`.
    pub fn input(mut self, at_ms: u64, event: MenuEvent) -> Self {
        self.inputs.push((Duration::from_millis(at_ms), event));
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Schedules every input, runs the simulation until nothing is left to
    /// deliver, then invokes the oracle on the final world.
    pub fn run(self) -> Result<World, String> {
        let Scenario { name, config, seed, jitter, faults, inputs } = self.scenario;

        let driver = SimDriver::new(seed).with_jitter(jitter).with_faults(faults);
        let mut sim = Simulation::new(config, driver)
            .map_err(|e| format!("Scenario '{name}': invalid config: {e}"))?;

        for (at, event) in inputs {
            sim.schedule(at, event);
        }
        sim.run();

        let (driver, menu) = sim.into_parts();
        let world = World::new(menu, driver);
        (self.oracle)(&world).map_err(|e| format!("Scenario '{name}': {e}"))?;

        Ok(world)
    }
}
