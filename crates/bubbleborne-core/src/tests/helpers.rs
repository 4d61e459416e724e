//! Test helper functions for building levels and inspecting simulations.
//!
//! Factory functions keep scenario tests short and make sure every test lays
//! out geometry the same way.

use std::cell::RefCell;
use std::rc::Rc;

use froth::{BodyCategory, BodyDesc, BodyId};
use glam::Vec2;

use crate::audio::AudioPool;
use crate::collaborators::SessionTally;
use crate::config::SimulationConfig;
use crate::events::{LoggedEvent, SimEvent};
use crate::simulation::Simulation;

// =============================================================================
// Simulation Setup
// =============================================================================

/// Shared handles to the collaborators injected into a test simulation.
pub struct Observers {
    /// Session notified of deaths.
    pub session: Rc<RefCell<SessionTally>>,
    /// Audio pool receiving cues.
    pub audio: Rc<RefCell<AudioPool>>,
}

/// Creates a simulation with default configuration.
pub fn test_sim() -> Simulation {
    Simulation::new(SimulationConfig::default()).unwrap()
}

/// Creates a simulation whose session and audio pool the test can inspect.
pub fn observed_sim(config: SimulationConfig) -> (Simulation, Observers) {
    let session = Rc::new(RefCell::new(SessionTally::default()));
    let audio = Rc::new(RefCell::new(AudioPool::new(&config.audio)));
    let sim = Simulation::new(config)
        .unwrap()
        .with_session(Box::new(Rc::clone(&session)))
        .with_sound(Box::new(Rc::clone(&audio)));
    (sim, Observers { session, audio })
}

// =============================================================================
// Level Geometry
// =============================================================================

/// Spawns a static box of the given category.
pub fn spawn_box(sim: &mut Simulation, category: BodyCategory, center: Vec2, half: Vec2) -> BodyId {
    sim.world_mut()
        .spawn(BodyDesc::static_box(category, center, half))
        .unwrap()
}

/// Spawns a wide terrain floor whose top surface is at `top`.
pub fn spawn_floor(sim: &mut Simulation, top: f32) -> BodyId {
    spawn_box(
        sim,
        BodyCategory::Terrain,
        Vec2::new(0.0, top - 0.5),
        Vec2::new(50.0, 0.5),
    )
}

/// Spawns a hazard slab centred at `center`.
pub fn spawn_hazard(sim: &mut Simulation, center: Vec2) -> BodyId {
    spawn_box(sim, BodyCategory::Hazard, center, Vec2::new(2.0, 0.2))
}

/// Spawns a hazard trigger volume centred at `center`.
pub fn spawn_hazard_trigger(sim: &mut Simulation, center: Vec2, radius: f32) -> BodyId {
    sim.world_mut()
        .spawn(BodyDesc::static_circle(BodyCategory::Hazard, center, radius).as_trigger())
        .unwrap()
}

/// Spawns a stationary enemy circle centred at `center`.
pub fn spawn_enemy(sim: &mut Simulation, center: Vec2) -> BodyId {
    sim.world_mut()
        .spawn(BodyDesc::static_circle(BodyCategory::Enemy, center, 0.5))
        .unwrap()
}

// =============================================================================
// Driving
// =============================================================================

/// Runs `ticks` steps.
pub fn run(sim: &mut Simulation, ticks: u32) {
    for _ in 0..ticks {
        sim.step();
    }
}

/// Steps until `done` holds or `max_ticks` pass. Returns the ticks taken.
pub fn run_until(
    sim: &mut Simulation,
    max_ticks: u32,
    mut done: impl FnMut(&Simulation) -> bool,
) -> Option<u32> {
    for tick in 0..max_ticks {
        if done(sim) {
            return Some(tick);
        }
        sim.step();
    }
    done(sim).then_some(max_ticks)
}

/// Applies a hit and lets any shrink animation finish.
pub fn hit_and_settle(sim: &mut Simulation, bubble: BodyId) {
    sim.shrink_bubble(bubble);
    run(sim, 20);
}

// =============================================================================
// Inspection
// =============================================================================

/// Events in `log` matching `pred`, without ticks.
pub fn events_where(log: &[LoggedEvent], pred: impl Fn(&SimEvent) -> bool) -> Vec<SimEvent> {
    log.iter().map(|e| e.event).filter(|e| pred(e)).collect()
}

/// Position of a body, panicking if it is gone.
pub fn position_of(sim: &Simulation, id: BodyId) -> Vec2 {
    sim.world().body(id).unwrap().position()
}
