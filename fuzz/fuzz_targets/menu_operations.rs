//! Random operation sequences must drive the controller exactly like the
//! reference model.

#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use drawer_core::{CloseTrigger, MenuAction, MenuConfig, MenuController, SignalPolicy, Timeline};
use drawer_harness::{ModelMenu, Operation};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    expected: u8,
    counted: bool,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let expected = input.expected % 8 + 1;
    let policy = if input.counted { SignalPolicy::Counted } else { SignalPolicy::PerSource };
    let config = MenuConfig {
        exit: Timeline::uniform(expected, Duration::from_millis(1)),
        policy,
        ..MenuConfig::default()
    };
    let Ok(mut menu) = MenuController::new(config) else {
        return;
    };
    let mut model = ModelMenu::new(usize::from(expected), policy);

    for op in &input.ops {
        let actions = match op {
            Operation::Open => menu.open(),
            Operation::Close => menu.request_close(CloseTrigger::Escape),
            Operation::Signal { .. } => match model.signal_for(op) {
                Some(signal) => menu.handle_completion_signal(signal),
                None => Vec::new(),
            },
        };
        let outcome = model.apply(op);

        let dismissed: Vec<_> = actions
            .iter()
            .filter_map(|action| match action {
                MenuAction::Dismiss { cycle } => Some(*cycle),
                _ => None,
            })
            .collect();
        assert_eq!(outcome.state, menu.state());
        assert_eq!(dismissed.first().copied(), outcome.dismissed);
        assert!(dismissed.len() <= 1);
    }
});
