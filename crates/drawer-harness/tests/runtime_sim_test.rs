//! The async runtime loop over the simulated visual layer, and replay of the
//! traces it records.

use std::time::Duration;

use drawer_app::{AppEvent, Runtime};
use drawer_core::{
    CloseTrigger, CycleId, MenuAction, MenuConfig, MenuController, MenuEvent, MenuState,
};
use drawer_harness::{Faults, SimDriver, Trace};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn runtime(driver: SimDriver) -> Runtime<SimDriver> {
    Runtime::new(driver, MenuController::new(MenuConfig::default()).unwrap())
}

#[tokio::test]
async fn run_drains_schedule_and_stops() {
    let mut driver = SimDriver::new(3).with_jitter(ms(20));
    driver.schedule(ms(0), MenuEvent::Open);
    driver.schedule(ms(50), MenuEvent::Close(CloseTrigger::Backdrop));

    let mut runtime = runtime(driver);
    let Ok(()) = runtime.run().await;

    assert!(!runtime.is_running());
    assert!(runtime.driver().is_stopped());
    assert_eq!(runtime.menu().state(), MenuState::Closed);
    assert_eq!(runtime.driver().dismissals().len(), 1);
    // Initial frame, open, close, dismissal
    assert_eq!(runtime.driver().renders(), 4);
}

#[tokio::test]
async fn quit_before_signals_leaves_menu_closing() {
    let mut driver = SimDriver::new(0);
    driver.schedule(ms(0), MenuEvent::Open);
    driver.schedule(ms(10), MenuEvent::Close(CloseTrigger::Escape));
    driver.schedule(ms(400), AppEvent::Quit);

    let mut runtime = runtime(driver);
    let Ok(()) = runtime.run().await;

    assert_eq!(runtime.menu().state(), MenuState::Closing);
    assert_eq!(runtime.menu().active_cycle().map(|c| c.received()), Some(1));
    assert!(runtime.driver().dismissals().is_empty());
    assert!(runtime.driver().is_stopped());
}

#[tokio::test]
async fn recorded_trace_replays_to_same_outcome() {
    let mut driver = SimDriver::new(11)
        .with_jitter(ms(100))
        .with_faults(Faults::none().duplicate_transition(1));
    driver.schedule(ms(0), MenuEvent::Open);
    driver.schedule(ms(100), MenuEvent::Close(CloseTrigger::CloseButton));
    driver.schedule(ms(250), MenuEvent::Open);
    driver.schedule(ms(300), MenuEvent::Close(CloseTrigger::Escape));

    let mut runtime = runtime(driver);
    let Ok(()) = runtime.run().await;
    let (driver, menu) = runtime.into_parts();

    let bytes = driver.trace().to_cbor().unwrap();
    let trace = Trace::from_cbor(&bytes).unwrap();
    assert_eq!(&trace, driver.trace());

    let (replayed, actions) = trace.replay(MenuConfig::default()).unwrap();
    assert_eq!(replayed.state(), menu.state());
    assert_eq!(replayed.dismissals(), menu.dismissals());

    let dismissed: Vec<CycleId> = actions
        .iter()
        .filter_map(|action| match action {
            MenuAction::Dismiss { cycle } => Some(*cycle),
            _ => None,
        })
        .collect();
    assert_eq!(dismissed, vec![CycleId::new(2)]);
    assert!(actions.contains(&MenuAction::AbortExit { cycle: CycleId::new(1) }));
}
