//! Headless Bubbleborne run.
//!
//! Builds a small level, drives the hunter with a fixed input script (moving,
//! pulling and shooting) and prints the event log as JSON lines.
//!
//! ```text
//! bubbleborne-headless [CONFIG.json] [TICKS]
//! ```
//!
//! Set `RUST_LOG` to control log output (defaults to `bubbleborne_core=debug`).

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use bubbleborne_core::froth::{BodyCategory, BodyDesc};
use bubbleborne_core::{SessionTally, SimEvent, Simulation, SimulationConfig};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_TICKS: u32 = 600;

fn build_level(sim: &mut Simulation) -> anyhow::Result<()> {
    let world = sim.world_mut();
    // Floor, walls and a spiked ceiling.
    world.spawn(BodyDesc::static_box(
        BodyCategory::Terrain,
        Vec2::new(0.0, -0.5),
        Vec2::new(12.0, 0.5),
    ))?;
    for x in [-12.0, 12.0] {
        world.spawn(BodyDesc::static_box(
            BodyCategory::Terrain,
            Vec2::new(x, 6.0),
            Vec2::new(0.5, 6.5),
        ))?;
    }
    world.spawn(BodyDesc::static_box(
        BodyCategory::Hazard,
        Vec2::new(0.0, 12.0),
        Vec2::new(12.0, 0.3),
    ))?;
    world.spawn(BodyDesc::static_circle(
        BodyCategory::Enemy,
        Vec2::new(10.0, 5.0),
        0.5,
    ))?;
    world.spawn(BodyDesc::static_box(
        BodyCategory::Background,
        Vec2::new(-4.0, 3.0),
        Vec2::new(1.5, 1.5),
    ))?;

    for column in 0..6u8 {
        let x = f32::from(column) * 1.5 - 3.75;
        sim.spawn_bubble(Vec2::new(x, 1.0))?;
    }
    sim.spawn_hunter(Vec2::new(-8.0, 0.5))?;
    Ok(())
}

fn drive(sim: &mut Simulation, tick: u32) {
    match tick {
        0 => sim.set_move_input(Vec2::X),
        60 | 360 | 480 => sim.fire(),
        120 => sim.press_pull(),
        240 => sim.release_pull(),
        300 => sim.set_move_input(Vec2::NEG_X),
        420 => sim.set_move_input(Vec2::ZERO),
        _ => {}
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("bubbleborne_core=debug".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::from_json_file(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => SimulationConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    let session = Rc::new(RefCell::new(SessionTally::default()));
    let mut sim = Simulation::new(config)?.with_session(Box::new(Rc::clone(&session)));
    build_level(&mut sim)?;
    info!(ticks, bubbles = sim.bubble_count(), "starting headless run");

    let mut pops = 0usize;
    let mut kills = 0usize;
    for tick in 0..ticks {
        drive(&mut sim, tick);
        sim.step();
        for logged in sim.take_events() {
            match logged.event {
                SimEvent::DeathStarted { .. } => pops += 1,
                SimEvent::EnemyDestroyed { .. } => kills += 1,
                _ => {}
            }
            println!("{}", serde_json::to_string(&logged)?);
        }
    }

    let session = session.borrow();
    info!(
        ticks = sim.tick(),
        bubbles_left = sim.bubble_count(),
        pops,
        kills,
        bubble_deaths = session.bubble_deaths.len(),
        hunter_deaths = session.hunter_deaths,
        "headless run finished"
    );
    Ok(())
}
