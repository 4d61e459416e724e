//! Interfaces to the world outside the simulation.
//!
//! The simulation reports to an [`Animator`] (optional, one per bubble and
//! one for the hunter) and a
//! [`Session`] (one per simulation). Both are injected; nothing here is global.
//!
//! Shared handles (`Rc<RefCell<T>>`) implement the traits too, so a caller can
//! keep a handle to inspect what the simulation reported.

use std::cell::RefCell;
use std::rc::Rc;

use froth::BodyId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Animation
// =============================================================================

/// One-shot animation triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationTrigger {
    /// A bubble was hit.
    TakeDamage,
    /// A bubble or the hunter started dying.
    IsDying,
}

/// Animation driver for a single actor.
pub trait Animator {
    /// Reports per-axis movement flags.
    fn set_moving(&mut self, moving_x: bool, moving_y: bool);

    /// Reports whether the actor is moving at all.
    fn set_in_motion(&mut self, moving: bool);

    /// Fires a one-shot trigger.
    fn trigger(&mut self, trigger: AnimationTrigger);

    /// Length in seconds of the first clip whose name contains `fragment`.
    fn clip_length(&self, fragment: &str) -> Option<f32>;
}

/// Plain-data animator that remembers what it was told.
///
/// # Example
///
/// ```
/// use bubbleborne_core::collaborators::{Animator, AnimatorState};
///
/// let animator = AnimatorState::default().with_clip("Bubble_Death", 0.8);
/// assert_eq!(animator.clip_length("Death"), Some(0.8));
/// assert_eq!(animator.clip_length("Idle"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimatorState {
    /// Last reported horizontal movement flag.
    pub moving_x: bool,
    /// Last reported vertical movement flag.
    pub moving_y: bool,
    /// Last reported overall movement flag.
    pub in_motion: bool,
    /// Triggers fired so far, oldest first.
    pub triggers: Vec<AnimationTrigger>,
    clips: Vec<(String, f32)>,
}

impl AnimatorState {
    /// Adds a named clip.
    #[must_use]
    pub fn with_clip(mut self, name: impl Into<String>, length: f32) -> Self {
        self.clips.push((name.into(), length));
        self
    }

    /// Whether the trigger has fired at least once.
    #[must_use]
    pub fn fired(&self, trigger: AnimationTrigger) -> bool {
        self.triggers.contains(&trigger)
    }
}

impl Animator for AnimatorState {
    fn set_moving(&mut self, moving_x: bool, moving_y: bool) {
        self.moving_x = moving_x;
        self.moving_y = moving_y;
    }

    fn set_in_motion(&mut self, moving: bool) {
        self.in_motion = moving;
    }

    fn trigger(&mut self, trigger: AnimationTrigger) {
        self.triggers.push(trigger);
    }

    fn clip_length(&self, fragment: &str) -> Option<f32> {
        self.clips
            .iter()
            .find(|(name, _)| name.contains(fragment))
            .map(|(_, length)| *length)
    }
}

impl<A: Animator + ?Sized> Animator for Rc<RefCell<A>> {
    fn set_moving(&mut self, moving_x: bool, moving_y: bool) {
        self.borrow_mut().set_moving(moving_x, moving_y);
    }

    fn set_in_motion(&mut self, moving: bool) {
        self.borrow_mut().set_in_motion(moving);
    }

    fn trigger(&mut self, trigger: AnimationTrigger) {
        self.borrow_mut().trigger(trigger);
    }

    fn clip_length(&self, fragment: &str) -> Option<f32> {
        self.borrow().clip_length(fragment)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Game session notified of deaths.
pub trait Session {
    /// A bubble entered teardown. Called exactly once per bubble.
    fn on_bubble_died(&mut self, bubble: BodyId);

    /// The hunter died. Called at most once.
    fn on_hunter_died(&mut self);
}

/// Session that counts what it was told.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTally {
    /// Bubbles reported dead, in order.
    pub bubble_deaths: Vec<BodyId>,
    /// Number of hunter deaths reported.
    pub hunter_deaths: u32,
}

impl Session for SessionTally {
    fn on_bubble_died(&mut self, bubble: BodyId) {
        self.bubble_deaths.push(bubble);
    }

    fn on_hunter_died(&mut self) {
        self.hunter_deaths += 1;
    }
}

impl<S: Session + ?Sized> Session for Rc<RefCell<S>> {
    fn on_bubble_died(&mut self, bubble: BodyId) {
        self.borrow_mut().on_bubble_died(bubble);
    }

    fn on_hunter_died(&mut self) {
        self.borrow_mut().on_hunter_died();
    }
}
