//! Reusable oracles.

use drawer_core::MenuState;

use super::OracleFn;

/// Exactly `count` dismissal notifications.
pub fn dismissed_times(count: usize) -> OracleFn {
    Box::new(move |world| {
        if world.dismissal_count() == count {
            Ok(())
        } else {
            Err(format!(
                "expected {count} dismissals, got {}: {:?}",
                world.dismissal_count(),
                world.dismissals()
            ))
        }
    })
}

/// No dismissal notification at all.
pub fn never_dismissed() -> OracleFn {
    dismissed_times(0)
}

/// The menu ends in `state`.
pub fn final_state(state: MenuState) -> OracleFn {
    Box::new(move |world| {
        if world.state() == state {
            Ok(())
        } else {
            Err(format!("expected final state {state:?}, got {:?}", world.state()))
        }
    })
}

/// No cycle dismissed before every exit transition could have finished.
pub fn dismissed_after_settle() -> OracleFn {
    Box::new(|world| {
        if world.dismissals_after_settle() {
            Ok(())
        } else {
            Err(format!(
                "dismissed before exit settled ({:?}): {:?}",
                world.menu().config().exit.settle_time(),
                world.dismissals()
            ))
        }
    })
}

/// Each cycle dismissed at most once.
pub fn dismissals_unique() -> OracleFn {
    Box::new(|world| {
        if world.dismissals_unique() {
            Ok(())
        } else {
            Err(format!("cycle dismissed more than once: {:?}", world.dismissals()))
        }
    })
}

/// Every oracle must pass; reports the first failure.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world| oracles.iter().try_for_each(|oracle| oracle(world)))
}
