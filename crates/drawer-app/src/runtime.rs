//! Generic runtime.
//!
//! Single-threaded event loop: events from the driver go through the menu
//! controller one at a time, and every action the controller returns is
//! executed before the next event is looked at.

use drawer_core::{MenuAction, MenuController};
use tracing::{debug, info};

use crate::{AppEvent, Driver};

/// Orchestration loop binding a [`MenuController`] to a [`Driver`].
pub struct Runtime<D: Driver> {
    driver: D,
    menu: MenuController,
    running: bool,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime.
    pub fn new(driver: D, menu: MenuController) -> Self {
        Self { driver, menu, running: true }
    }

    /// The menu state machine.
    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// True until a [`AppEvent::Quit`] is processed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Consume the runtime, returning the driver and controller.
    pub fn into_parts(self) -> (D, MenuController) {
        (self.driver, self.menu)
    }

    /// Run until quit.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. The driver is stopped in every case.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let result = self.run_loop().await;
        self.driver.stop();
        info!(dismissals = self.menu.dismissals(), "runtime stopped");
        result
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.menu)?;

        while self.running {
            let events = self.driver.poll_events().await?;
            for event in events {
                self.process(event)?;
                if !self.running {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single event.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to execute a resulting action.
    pub fn process(&mut self, event: AppEvent) -> Result<(), D::Error> {
        match event {
            AppEvent::Quit => {
                debug!("quit requested");
                self.running = false;
                Ok(())
            },
            AppEvent::Tick => self.driver.render(&self.menu),
            AppEvent::Menu(event) => {
                for action in self.menu.handle(event) {
                    self.execute(action)?;
                }
                Ok(())
            },
        }
    }

    fn execute(&mut self, action: MenuAction) -> Result<(), D::Error> {
        debug!(?action, "executing action");
        match action {
            MenuAction::StartEntry => self.driver.start_entry(&self.menu.config().entry),
            MenuAction::StartExit { cycle } => {
                self.driver.start_exit(cycle, &self.menu.config().exit)
            },
            MenuAction::AbortExit { cycle } => {
                self.driver.abort_exit(cycle);
                Ok(())
            },
            MenuAction::Dismiss { cycle } => self.driver.dismissed(cycle),
            MenuAction::Render => self.driver.render(&self.menu),
        }
    }
}
