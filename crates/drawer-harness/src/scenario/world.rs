//! World state after scenario execution.
//!
//! The World holds the menu controller and the simulated driver once a
//! scenario has run, and provides oracle verification helpers.

use std::time::Duration;

use drawer_core::{CycleId, MenuController, MenuState};

use crate::{SimDriver, Trace};

/// Final state of a scenario.
pub struct World {
    menu: MenuController,
    driver: SimDriver,
}

impl World {
    pub(crate) fn new(menu: MenuController, driver: SimDriver) -> Self {
        Self { menu, driver }
    }

    /// The menu controller.
    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    /// The simulated driver.
    pub fn driver(&self) -> &SimDriver {
        &self.driver
    }

    /// Final menu state.
    pub fn state(&self) -> MenuState {
        self.menu.state()
    }

    /// Dismissal notifications with their times.
    pub fn dismissals(&self) -> &[(CycleId, Duration)] {
        self.driver.dismissals()
    }

    /// Number of dismissal notifications.
    pub fn dismissal_count(&self) -> usize {
        self.driver.dismissals().len()
    }

    /// Cancelled closes.
    pub fn aborted(&self) -> &[CycleId] {
        self.driver.aborted()
    }

    /// Time the close for `cycle` was requested.
    pub fn exit_started(&self, cycle: CycleId) -> Option<Duration> {
        self.driver.exits_started().iter().find(|(id, _)| *id == cycle).map(|(_, at)| *at)
    }

    /// Menu events in delivery order.
    pub fn trace(&self) -> &Trace {
        self.driver.trace()
    }

    /// True if no dismissal fired before all exit transitions could finish.
    pub fn dismissals_after_settle(&self) -> bool {
        let settle = self.menu.config().exit.settle_time();
        self.dismissals().iter().all(|(cycle, at)| {
            self.exit_started(*cycle).is_some_and(|started| *at >= started + settle)
        })
    }

    /// True if no cycle was dismissed twice.
    pub fn dismissals_unique(&self) -> bool {
        let mut cycles: Vec<CycleId> = self.dismissals().iter().map(|(cycle, _)| *cycle).collect();
        let total = cycles.len();
        cycles.sort_unstable();
        cycles.dedup();
        cycles.len() == total
    }
}
