//! Dismissal scenarios over the simulated visual layer.
//!
//! Default exit timeline, closed at t=100ms unless noted:
//! - A: panel-overlay fade, reports at 300ms
//! - B: panel slide, reports at 600ms
//! - C: backdrop fade, reports at 1000ms

use std::time::Duration;

use drawer_core::{CycleId, MenuConfig, MenuState, SignalPolicy};
use drawer_harness::{
    Faults,
    scenario::{Scenario, oracle},
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn signal_sources(world: &drawer_harness::scenario::World) -> Vec<u8> {
    world
        .trace()
        .entries()
        .iter()
        .filter_map(|entry| match entry.event {
            drawer_core::MenuEvent::TransitionEnded(signal) => Some(signal.source.index() as u8),
            _ => None,
        })
        .collect()
}

#[test]
fn in_order_signals_dismiss_once() {
    let world = Scenario::new("A, B, C")
        .open_at(0)
        .close_at(100)
        .oracle(oracle::all_of(vec![
            oracle::dismissed_times(1),
            oracle::final_state(MenuState::Closed),
            oracle::dismissed_after_settle(),
        ]))
        .run()
        .unwrap();

    assert_eq!(signal_sources(&world), vec![0, 1, 2]);
    assert_eq!(world.dismissals(), &[(CycleId::new(1), ms(1000))]);
}

#[test]
fn reordered_signals_dismiss_once() {
    // Hold A and B back so the backdrop finishes first: C at 1000, A at 1300, B at 1400
    let faults = Faults::none().delay_transition(0, ms(1000)).delay_transition(1, ms(800));

    let world = Scenario::new("C, A, B")
        .faults(faults)
        .open_at(0)
        .close_at(100)
        .oracle(oracle::all_of(vec![
            oracle::dismissed_times(1),
            oracle::final_state(MenuState::Closed),
        ]))
        .run()
        .unwrap();

    assert_eq!(signal_sources(&world), vec![2, 0, 1]);
    assert_eq!(world.dismissals(), &[(CycleId::new(1), ms(1400))]);
}

#[test]
fn missing_signal_leaves_menu_closing() {
    let world = Scenario::new("A, B only")
        .faults(Faults::none().drop_transition(2))
        .open_at(0)
        .close_at(100)
        .oracle(oracle::all_of(vec![
            oracle::never_dismissed(),
            oracle::final_state(MenuState::Closing),
        ]))
        .run()
        .unwrap();

    assert_eq!(world.menu().active_cycle().map(|c| c.received()), Some(2));
}

#[test]
fn reopen_before_signals_discards_aborted_cycle() {
    let world = Scenario::new("reopen, then close again")
        .open_at(0)
        .close_at(100)
        .open_at(150)
        // Stray A from the aborted close, on top of the runners still in flight
        .signal_at(200, 1, 0)
        .close_at(2000)
        .oracle(oracle::all_of(vec![
            oracle::dismissed_times(1),
            oracle::final_state(MenuState::Closed),
            oracle::dismissed_after_settle(),
        ]))
        .run()
        .unwrap();

    assert_eq!(world.aborted(), &[CycleId::new(1)]);
    assert_eq!(world.dismissals(), &[(CycleId::new(2), ms(2900))]);
}

#[test]
fn reopen_without_second_close_stays_open() {
    Scenario::new("reopen only")
        .open_at(0)
        .close_at(100)
        .open_at(150)
        .oracle(oracle::all_of(vec![
            oracle::never_dismissed(),
            oracle::final_state(MenuState::Open),
        ]))
        .run()
        .unwrap();
}

#[test]
fn partial_progress_does_not_carry_over() {
    // A and B of cycle 1 land, then the menu reopens at 700 and closes at
    // 800. Cycle 1's C still fires at 1000 and must not count for cycle 2.
    let world = Scenario::new("reopen after partial close")
        .open_at(0)
        .close_at(100)
        .open_at(700)
        .close_at(800)
        .oracle(oracle::all_of(vec![
            oracle::dismissed_times(1),
            oracle::dismissed_after_settle(),
        ]))
        .run()
        .unwrap();

    assert_eq!(world.dismissals(), &[(CycleId::new(2), ms(1700))]);
}

#[test]
fn duplicate_signal_dismisses_once_after_all_transitions() {
    let world = Scenario::new("A, A, B, C")
        .faults(Faults::none().duplicate_transition(0))
        .open_at(0)
        .close_at(100)
        .oracle(oracle::all_of(vec![
            oracle::dismissed_times(1),
            oracle::dismissals_unique(),
            oracle::dismissed_after_settle(),
        ]))
        .run()
        .unwrap();

    assert_eq!(signal_sources(&world), vec![0, 0, 1, 2]);
    assert_eq!(world.dismissals(), &[(CycleId::new(1), ms(1000))]);
}

#[test]
fn counted_policy_dismisses_early_on_duplicate() {
    // Naive counting takes the duplicate A for a third transition: the
    // dismissal fires when B lands, before the backdrop has faded.
    let result = Scenario::new("A, A, B, C counted")
        .config(MenuConfig::with_policy(SignalPolicy::Counted))
        .faults(Faults::none().duplicate_transition(0))
        .open_at(0)
        .close_at(100)
        .oracle(oracle::all_of(vec![oracle::dismissed_times(1), oracle::dismissed_after_settle()]))
        .run();

    let err = result.err().unwrap_or_default();
    assert!(err.contains("dismissed before exit settled"), "{err}");
}

#[test]
fn repeated_close_requests_arm_one_cycle() {
    let world = Scenario::new("double close")
        .open_at(0)
        .close_at(100)
        .close_at(100)
        .close_at(400)
        .oracle(oracle::dismissed_times(1))
        .run()
        .unwrap();

    assert_eq!(world.driver().exits_started(), &[(CycleId::new(1), ms(100))]);
}

#[test]
fn jittered_closes_dismiss_once_for_many_seeds() {
    for seed in 0..50 {
        Scenario::new(format!("jitter seed {seed}"))
            .seed(seed)
            .jitter(ms(400))
            .open_at(0)
            .close_at(100)
            .open_at(1600)
            .close_at(1700)
            .oracle(oracle::all_of(vec![
                oracle::dismissed_times(2),
                oracle::dismissals_unique(),
                oracle::dismissed_after_settle(),
                oracle::final_state(MenuState::Closed),
            ]))
            .run()
            .unwrap();
    }
}
