//! Transition timelines.
//!
//! A [`Timeline`] lists the visual transitions that run when the menu enters
//! or leaves the screen. The core never schedules them; it only needs the exit
//! timeline's length as the number of completion signals a close must wait for.
//! Frontends and the simulation harness use the timings to drive their own
//! runners.
//!
//! # Default exit timeline
//!
//! ```text
//! 0ms        200ms   300ms   500ms   600ms          900ms
//! ├─ panel-overlay ─┤
//!                    ├─ panel slide ─┤
//!                                    ├─── backdrop fade ───┤
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::signal::TransitionId;

/// Visual effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Opacity 0 to 1.
    FadeIn,
    /// Opacity 1 to 0.
    FadeOut,
    /// Slide from off-screen into place.
    SlideIn,
    /// Slide from place to off-screen.
    SlideOut,
}

/// Timing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Starts slow.
    EaseIn,
    /// Ends slow.
    EaseOut,
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// One visual transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Position in the owning timeline; completion signals carry it.
    pub id: TransitionId,
    /// Element the transition animates (`backdrop`, `panel`,
    /// `panel-overlay`); also used in logs.
    pub name: String,
    /// What the transition does.
    pub effect: Effect,
    /// Running time once started.
    pub duration: Duration,
    /// Wait before starting.
    pub delay: Duration,
    /// Timing curve.
    pub easing: Easing,
}

impl TransitionSpec {
    /// Build a transition.
    pub fn new(
        id: u8,
        name: impl Into<String>,
        effect: Effect,
        duration: Duration,
        delay: Duration,
        easing: Easing,
    ) -> Self {
        Self { id: TransitionId::new(id), name: name.into(), effect, duration, delay, easing }
    }

    /// Time from start request until the transition finishes.
    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }

    /// Eased progress in `[0, 1]` after `elapsed` since the start request.
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        if elapsed <= self.delay {
            return if self.duration.is_zero() && elapsed == self.delay { 1.0 } else { 0.0 };
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        let running = (elapsed - self.delay).as_secs_f32() / self.duration.as_secs_f32();
        self.easing.apply(running.min(1.0))
    }
}

/// Ordered set of transitions for one direction of the menu.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timeline {
    transitions: Vec<TransitionSpec>,
}

impl Timeline {
    /// Wrap a list of transitions.
    pub fn new(transitions: Vec<TransitionSpec>) -> Self {
        Self { transitions }
    }

    /// Panel overlay fades in, panel slides out, backdrop fades out.
    pub fn exit_default() -> Self {
        Self::new(vec![
            TransitionSpec::new(
                0,
                "panel-overlay",
                Effect::FadeIn,
                Duration::from_millis(200),
                Duration::ZERO,
                Easing::EaseIn,
            ),
            TransitionSpec::new(
                1,
                "panel",
                Effect::SlideOut,
                Duration::from_millis(200),
                Duration::from_millis(300),
                Easing::EaseIn,
            ),
            TransitionSpec::new(
                2,
                "backdrop",
                Effect::FadeOut,
                Duration::from_millis(300),
                Duration::from_millis(600),
                Easing::EaseIn,
            ),
        ])
    }

    /// Backdrop fades in, panel slides in, panel overlay fades out.
    pub fn entry_default() -> Self {
        Self::new(vec![
            TransitionSpec::new(
                0,
                "backdrop",
                Effect::FadeIn,
                Duration::from_millis(200),
                Duration::ZERO,
                Easing::EaseOut,
            ),
            TransitionSpec::new(
                1,
                "panel",
                Effect::SlideIn,
                Duration::from_millis(200),
                Duration::from_millis(200),
                Easing::EaseOut,
            ),
            TransitionSpec::new(
                2,
                "panel-overlay",
                Effect::FadeOut,
                Duration::from_millis(200),
                Duration::from_millis(400),
                Easing::EaseOut,
            ),
        ])
    }

    /// `count` anonymous linear fades that all run for `duration`.
    pub fn uniform(count: u8, duration: Duration) -> Self {
        Self::new(
            (0..count)
                .map(|i| {
                    TransitionSpec::new(
                        i,
                        format!("transition-{i}"),
                        Effect::FadeOut,
                        duration,
                        Duration::ZERO,
                        Easing::Linear,
                    )
                })
                .collect(),
        )
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// True if there are no transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Transitions in timeline order.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionSpec> {
        self.transitions.iter()
    }

    /// Look up a transition by id.
    pub fn get(&self, id: TransitionId) -> Option<&TransitionSpec> {
        self.transitions.get(id.index()).filter(|spec| spec.id == id)
    }

    /// Time until the last transition finishes.
    pub fn settle_time(&self) -> Duration {
        self.transitions.iter().map(TransitionSpec::end).max().unwrap_or(Duration::ZERO)
    }

    /// Copy with every delay and duration multiplied by `factor`.
    ///
    /// Non-finite or negative factors leave the timeline unchanged.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        if !factor.is_finite() || factor < 0.0 {
            return self.clone();
        }
        Self::new(
            self.transitions
                .iter()
                .map(|spec| TransitionSpec {
                    duration: scale(spec.duration, factor),
                    delay: scale(spec.delay, factor),
                    ..spec.clone()
                })
                .collect(),
        )
    }
}

// Whole nanoseconds, so a factor of 1 is exact
fn scale(duration: Duration, factor: f64) -> Duration {
    Duration::from_nanos((duration.as_nanos() as f64 * factor).round() as u64)
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TransitionSpec;
    type IntoIter = std::slice::Iter<'a, TransitionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}
