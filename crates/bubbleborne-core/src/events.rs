//! Gameplay event log.
//!
//! The simulation records what happened each tick in an [`EventLog`]. Callers
//! drain it with `take_events()` for telemetry, replay checks or to drive
//! presentation.

use froth::BodyId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// The player pushed a bubble.
    Pushed {
        /// Bubble body.
        bubble: BodyId,
        /// Unit push direction.
        direction: Vec2,
    },
    /// A hit started shrinking a bubble.
    ShrinkStarted {
        /// Bubble body.
        bubble: BodyId,
        /// Size fraction before the hit.
        from: f32,
        /// Size fraction after the hit.
        to: f32,
    },
    /// A shrink reached its target size.
    ShrinkCompleted {
        /// Bubble body.
        bubble: BodyId,
        /// Final size fraction.
        size: f32,
    },
    /// A bubble entered its death sequence.
    DeathStarted {
        /// Bubble body.
        bubble: BodyId,
    },
    /// A bubble's teardown began and the session was notified.
    TeardownStarted {
        /// Bubble body.
        bubble: BodyId,
    },
    /// A bubble was removed from the world.
    Destroyed {
        /// Bubble body.
        bubble: BodyId,
    },
    /// The pull field engaged.
    PullEngaged,
    /// The pull field released the bubbles in its radius.
    PullReleased {
        /// Number of bubbles whose pulled flag was cleared.
        released: usize,
    },
    /// The hunter died.
    HunterDied,
    /// The hunter fired a bullet.
    ShotFired {
        /// Bullet body.
        bullet: BodyId,
        /// Unit shot direction.
        direction: Vec2,
    },
    /// A bullet hit an enemy and destroyed it.
    EnemyDestroyed {
        /// Enemy body, now removed.
        enemy: BodyId,
        /// Bullet that hit it.
        bullet: BodyId,
    },
    /// A bullet touched something and was removed.
    BulletSpent {
        /// Bullet body.
        bullet: BodyId,
    },
    /// A bullet ran out of lifetime and was removed.
    BulletExpired {
        /// Bullet body.
        bullet: BodyId,
    },
}

impl SimEvent {
    /// The bubble the event concerns, if any.
    #[must_use]
    pub const fn bubble(&self) -> Option<BodyId> {
        match self {
            Self::Pushed { bubble, .. }
            | Self::ShrinkStarted { bubble, .. }
            | Self::ShrinkCompleted { bubble, .. }
            | Self::DeathStarted { bubble }
            | Self::TeardownStarted { bubble }
            | Self::Destroyed { bubble } => Some(*bubble),
            Self::PullEngaged
            | Self::PullReleased { .. }
            | Self::HunterDied
            | Self::ShotFired { .. }
            | Self::EnemyDestroyed { .. }
            | Self::BulletSpent { .. }
            | Self::BulletExpired { .. } => None,
        }
    }
}

/// An event stamped with the tick it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Tick number.
    pub tick: u64,
    /// What happened.
    pub event: SimEvent,
}

/// Append-only log drained by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, tick: u64, event: SimEvent) {
        self.entries.push(LoggedEvent { tick, event });
    }

    /// Drains and returns every event, oldest first.
    pub fn take_events(&mut self) -> Vec<LoggedEvent> {
        std::mem::take(&mut self.entries)
    }

    /// Events not yet drained.
    #[must_use]
    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Number of events not yet drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_in_order() {
        let mut log = EventLog::new();
        log.record(1, SimEvent::PullEngaged);
        log.record(2, SimEvent::HunterDied);
        assert_eq!(log.len(), 2);

        let events = log.take_events();
        assert_eq!(events[0].tick, 1);
        assert_eq!(events[1].event, SimEvent::HunterDied);
        assert!(log.is_empty());
    }

    #[test]
    fn bubble_accessor() {
        let id = BodyId::new(4);
        assert_eq!(SimEvent::DeathStarted { bubble: id }.bubble(), Some(id));
        assert_eq!(SimEvent::PullReleased { released: 2 }.bubble(), None);
        assert_eq!(SimEvent::BulletSpent { bullet: id }.bubble(), None);
    }

    #[test]
    fn events_serialize() {
        let event = SimEvent::ShrinkStarted {
            bubble: BodyId::new(1),
            from: 1.0,
            to: 0.8,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
