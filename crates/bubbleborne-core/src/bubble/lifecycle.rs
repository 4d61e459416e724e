//! Shrink and death state machines.
//!
//! Every wait is an elapsed-time accumulator advanced once per tick; a phase
//! ends when its accumulator reaches the phase duration. Leftover time carries
//! into the next phase, but a single [`DeathSequence::advance`] performs at most
//! one transition, so no phase is ever skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::DeathTiming;

/// Cubic ease-out: `1 − (1 − t)³`, with `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Slack for timers built by summing `dt`, so a 0.3 s wait at 50 Hz ends on
/// tick 15 rather than 16.
pub(crate) const TIMER_EPSILON: f32 = 1e-5;

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        elapsed / duration
    } else {
        1.0
    }
}

/// Something the owner of a bubble has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// An animated shrink reached its target; the bubble floats again.
    ShrinkCompleted,
    /// The teardown phase began; the session must be told now.
    TeardownStarted,
    /// The death sequence finished; the body can be removed.
    Destroyed,
}

// =============================================================================
// Shrink
// =============================================================================

/// An in-flight animated shrink between two size fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShrinkAnimation {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl ShrinkAnimation {
    /// Starts a shrink from `from` to `to` over `duration` seconds.
    #[must_use]
    pub const fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Size fraction at the start.
    #[must_use]
    pub const fn from(&self) -> f32 {
        self.from
    }

    /// Size fraction at the end.
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.to
    }

    /// Seconds since the shrink began.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the target has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration - TIMER_EPSILON
    }

    /// Current eased size fraction; exactly the target once finished.
    #[must_use]
    pub fn current(&self) -> f32 {
        if self.is_finished() {
            self.to
        } else {
            lerp(self.from, self.to, ease_out_cubic(progress(self.elapsed, self.duration)))
        }
    }

    /// Advances the animation and returns the new size fraction.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.current()
    }
}

// =============================================================================
// Death
// =============================================================================

/// Phases of the death sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeathPhase {
    /// Waiting for an external death clip to finish.
    AwaitClip,
    /// Scaling up to the peak.
    Grow,
    /// Holding at peak scale.
    HoldPeak,
    /// Scaling down to zero.
    Collapse,
    /// Holding at zero scale.
    Settle,
    /// Session notified; waiting to destroy.
    Teardown,
}

impl DeathPhase {
    /// The phase that follows this one, `None` after teardown.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::AwaitClip => Some(Self::Grow),
            Self::Grow => Some(Self::HoldPeak),
            Self::HoldPeak => Some(Self::Collapse),
            Self::Collapse => Some(Self::Settle),
            Self::Settle => Some(Self::Teardown),
            Self::Teardown => None,
        }
    }
}

impl fmt::Display for DeathPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitClip => write!(f, "AwaitClip"),
            Self::Grow => write!(f, "Grow"),
            Self::HoldPeak => write!(f, "HoldPeak"),
            Self::Collapse => write!(f, "Collapse"),
            Self::Settle => write!(f, "Settle"),
            Self::Teardown => write!(f, "Teardown"),
        }
    }
}

/// Progress through the irreversible death sequence.
///
/// # Example
///
/// ```
/// use bubbleborne_core::bubble::{DeathPhase, DeathSequence, DeathTiming, LifecycleEvent};
///
/// let timing = DeathTiming::default();
/// let mut death = DeathSequence::new(1.0, None);
/// assert_eq!(death.phase(), DeathPhase::Grow);
///
/// let mut events = Vec::new();
/// for _ in 0..200 {
///     if let Some(event) = death.advance(0.02, &timing) {
///         events.push(event);
///     }
/// }
/// assert_eq!(events, vec![LifecycleEvent::TeardownStarted, LifecycleEvent::Destroyed]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathSequence {
    phase: DeathPhase,
    elapsed: f32,
    clip_length: f32,
    base_scale: f32,
    finished: bool,
}

impl DeathSequence {
    /// Starts a death sequence from `base_scale`.
    ///
    /// A positive `clip_length` inserts a wait for the external death clip
    /// before the scale effect.
    #[must_use]
    pub fn new(base_scale: f32, clip_length: Option<f32>) -> Self {
        let clip_length = clip_length.filter(|len| *len > 0.0).unwrap_or(0.0);
        Self {
            phase: if clip_length > 0.0 {
                DeathPhase::AwaitClip
            } else {
                DeathPhase::Grow
            },
            elapsed: 0.0,
            clip_length,
            base_scale,
            finished: false,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DeathPhase {
        self.phase
    }

    /// Seconds spent in the current phase.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Whether the sequence has completed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn duration(&self, timing: &DeathTiming) -> f32 {
        match self.phase {
            DeathPhase::AwaitClip => self.clip_length,
            DeathPhase::Grow => timing.grow_duration,
            DeathPhase::HoldPeak => timing.peak_hold,
            DeathPhase::Collapse => timing.collapse_duration,
            DeathPhase::Settle => timing.settle,
            DeathPhase::Teardown => timing.teardown_delay,
        }
    }

    /// Visual scale for the current phase.
    #[must_use]
    pub fn scale(&self, timing: &DeathTiming) -> f32 {
        let peak = self.base_scale * timing.grow_scale;
        let t = progress(self.elapsed, self.duration(timing));
        match self.phase {
            DeathPhase::AwaitClip => self.base_scale,
            DeathPhase::Grow => lerp(self.base_scale, peak, t),
            DeathPhase::HoldPeak => peak,
            DeathPhase::Collapse => lerp(peak, 0.0, t),
            DeathPhase::Settle | DeathPhase::Teardown => 0.0,
        }
    }

    /// Advances the current phase by `dt`, performing at most one transition.
    pub fn advance(&mut self, dt: f32, timing: &DeathTiming) -> Option<LifecycleEvent> {
        if self.finished {
            return None;
        }
        self.elapsed += dt;
        let duration = self.duration(timing);
        if self.elapsed < duration - TIMER_EPSILON {
            return None;
        }

        let overshoot = (self.elapsed - duration).max(0.0);
        if let Some(next) = self.phase.next() {
            self.phase = next;
            self.elapsed = overshoot;
            (next == DeathPhase::Teardown).then_some(LifecycleEvent::TeardownStarted)
        } else {
            self.finished = true;
            Some(LifecycleEvent::Destroyed)
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// Lifecycle state of a bubble.
///
/// Progression is monotonic toward `Dead`, except that `Shrinking` returns to
/// `Floating` when its animation completes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BubbleState {
    /// Normal operation.
    Floating,
    /// An animated shrink is in progress.
    Shrinking(ShrinkAnimation),
    /// The death sequence is running; physics is disabled.
    Dying(DeathSequence),
    /// Destroyed.
    Dead,
}

impl BubbleState {
    /// Whether the bubble still runs its motion policy.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self, Self::Floating | Self::Shrinking(_))
    }

    /// Whether a shrink animation is in progress.
    #[must_use]
    pub const fn is_shrinking(&self) -> bool {
        matches!(self, Self::Shrinking(_))
    }

    /// Whether the death sequence has started (or finished).
    #[must_use]
    pub const fn is_dying(&self) -> bool {
        matches!(self, Self::Dying(_) | Self::Dead)
    }
}

impl fmt::Display for BubbleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floating => write!(f, "Floating"),
            Self::Shrinking(_) => write!(f, "Shrinking"),
            Self::Dying(death) => write!(f, "Dying({})", death.phase()),
            Self::Dead => write!(f, "Dead"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    mod easing_tests {
        use super::*;

        #[test]
        fn endpoints() {
            assert_eq!(ease_out_cubic(0.0), 0.0);
            assert_eq!(ease_out_cubic(1.0), 1.0);
            assert_eq!(ease_out_cubic(2.0), 1.0);
        }

        #[test]
        fn front_loaded() {
            assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        }
    }

    mod shrink_tests {
        use super::*;

        #[test]
        fn reaches_target_exactly() {
            let mut anim = ShrinkAnimation::new(1.0, 0.8, 0.3);
            let mut last = 1.0;
            for _ in 0..20 {
                let size = anim.advance(DT);
                assert!(size <= last + 1e-6, "shrink grew: {last} -> {size}");
                last = size;
            }
            assert!(anim.is_finished());
            assert_eq!(anim.current(), 0.8);
        }

        #[test]
        fn finishes_on_the_exact_tick() {
            let mut anim = ShrinkAnimation::new(1.0, 0.8, 0.3);
            for _ in 0..14 {
                anim.advance(DT);
            }
            assert!(!anim.is_finished());
            anim.advance(DT);
            assert!(anim.is_finished());
        }

        #[test]
        fn eases_out() {
            let mut anim = ShrinkAnimation::new(1.0, 0.8, 0.3);
            let size = anim.advance(0.15);
            // Half the time covers 87.5% of the distance.
            assert!((size - (1.0 - 0.2 * 0.875)).abs() < 1e-5);
        }
    }

    mod death_tests {
        use super::*;

        fn run_to_end(mut death: DeathSequence, timing: &DeathTiming) -> Vec<DeathPhase> {
            let mut phases = vec![death.phase()];
            for _ in 0..1_000 {
                death.advance(DT, timing);
                if death.is_finished() {
                    break;
                }
                if phases.last() != Some(&death.phase()) {
                    phases.push(death.phase());
                }
            }
            assert!(death.is_finished());
            phases
        }

        #[test]
        fn phases_run_in_order_without_clip() {
            let timing = DeathTiming::default();
            let phases = run_to_end(DeathSequence::new(1.0, None), &timing);
            assert_eq!(
                phases,
                vec![
                    DeathPhase::Grow,
                    DeathPhase::HoldPeak,
                    DeathPhase::Collapse,
                    DeathPhase::Settle,
                    DeathPhase::Teardown,
                ]
            );
        }

        #[test]
        fn phase_ends_on_the_exact_tick() {
            let timing = DeathTiming::default();
            let mut death = DeathSequence::new(1.0, None);
            for _ in 0..14 {
                assert_eq!(death.advance(DT, &timing), None);
            }
            assert_eq!(death.phase(), DeathPhase::Grow);
            death.advance(DT, &timing);
            assert_eq!(death.phase(), DeathPhase::HoldPeak);

            // 0.2 s hold is 10 ticks.
            for _ in 0..9 {
                death.advance(DT, &timing);
            }
            assert_eq!(death.phase(), DeathPhase::HoldPeak);
            death.advance(DT, &timing);
            assert_eq!(death.phase(), DeathPhase::Collapse);
        }

        #[test]
        fn clip_wait_comes_first() {
            let timing = DeathTiming::default();
            let phases = run_to_end(DeathSequence::new(1.0, Some(0.4)), &timing);
            assert_eq!(phases[0], DeathPhase::AwaitClip);
            assert_eq!(phases[1], DeathPhase::Grow);
        }

        #[test]
        fn zero_clip_length_is_ignored() {
            assert_eq!(DeathSequence::new(1.0, Some(0.0)).phase(), DeathPhase::Grow);
        }

        #[test]
        fn zero_durations_still_visit_every_phase() {
            let timing = DeathTiming {
                grow_duration: 0.0,
                peak_hold: 0.0,
                collapse_duration: 0.0,
                settle: 0.0,
                teardown_delay: 0.0,
                ..DeathTiming::default()
            };
            let mut death = DeathSequence::new(1.0, None);
            let mut seen = vec![death.phase()];
            let mut events = Vec::new();
            while !death.is_finished() {
                if let Some(event) = death.advance(DT, &timing) {
                    events.push(event);
                }
                seen.push(death.phase());
            }
            assert_eq!(seen.len(), 6);
            assert_eq!(
                events,
                vec![LifecycleEvent::TeardownStarted, LifecycleEvent::Destroyed]
            );
        }

        #[test]
        fn scale_grows_then_collapses() {
            let timing = DeathTiming::default();
            let mut death = DeathSequence::new(0.6, None);
            assert!((death.scale(&timing) - 0.6).abs() < 1e-6);

            death.advance(0.3, &timing);
            assert_eq!(death.phase(), DeathPhase::HoldPeak);
            assert!((death.scale(&timing) - 0.9).abs() < 1e-6);

            death.advance(0.2, &timing);
            assert_eq!(death.phase(), DeathPhase::Collapse);
            death.advance(0.25, &timing);
            assert!((death.scale(&timing) - 0.45).abs() < 1e-5);

            death.advance(0.25, &timing);
            assert_eq!(death.phase(), DeathPhase::Settle);
            assert_eq!(death.scale(&timing), 0.0);
        }

        #[test]
        fn finished_sequence_is_inert() {
            let timing = DeathTiming::default();
            let mut death = DeathSequence::new(1.0, None);
            while !death.is_finished() {
                death.advance(0.1, &timing);
            }
            assert_eq!(death.advance(0.1, &timing), None);
        }
    }

    #[test]
    fn state_predicates() {
        assert!(BubbleState::Floating.is_alive());
        assert!(BubbleState::Shrinking(ShrinkAnimation::new(1.0, 0.8, 0.3)).is_shrinking());
        assert!(BubbleState::Dying(DeathSequence::new(1.0, None)).is_dying());
        assert!(BubbleState::Dead.is_dying());
        assert!(!BubbleState::Dead.is_alive());
        assert_eq!(BubbleState::Dying(DeathSequence::new(1.0, None)).to_string(), "Dying(Grow)");
    }
}
