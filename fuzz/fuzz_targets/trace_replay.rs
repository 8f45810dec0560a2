//! Arbitrary bytes must never panic the trace decoder, and any trace that
//! decodes must replay without dismissing a cycle twice.

#![no_main]

use std::collections::HashSet;

use drawer_core::{MenuAction, MenuConfig};
use drawer_harness::Trace;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(trace) = Trace::from_cbor(data) else {
        return;
    };
    let Ok((_, actions)) = trace.replay(MenuConfig::default()) else {
        return;
    };

    let mut dismissed = HashSet::new();
    for action in actions {
        if let MenuAction::Dismiss { cycle } = action {
            assert!(dismissed.insert(cycle), "cycle {cycle} dismissed twice");
        }
    }
});
