//! Property tests over the bubble and field rules.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use froth::{BodyCategory, BodyDesc, BodyId, PhysicsEngine, World, WorldConfig};
use glam::Vec2;
use proptest::prelude::*;

use crate::bubble::motion::{detect_corner, escape_direction};
use crate::bubble::{Bubble, BubbleConfig, BubbleState};
use crate::fields::{PullConfig, PullField};

const DT: f32 = 1.0 / 50.0;

fn any_angle() -> impl Strategy<Value = f32> {
    0.0_f32..TAU
}

fn spawn_bubble(world: &mut World, position: Vec2, config: BubbleConfig) -> Bubble {
    let desc = BodyDesc::dynamic_circle(BodyCategory::Bubble, position, config.collision_radius(1.0));
    let id = world.spawn(desc).unwrap();
    Bubble::new(id, config)
}

proptest! {
    #[test]
    fn floating_bubble_never_below_min_size(
        hits in 1_usize..10,
        shrink_amount in 0.05_f32..0.5,
        min_size in 0.1_f32..0.9,
    ) {
        let config = BubbleConfig {
            shrink_amount,
            min_size,
            ..BubbleConfig::default()
        };
        let mut world = World::new(WorldConfig::default());
        let mut bubble = spawn_bubble(&mut world, Vec2::ZERO, config);

        let mut previous = bubble.size_fraction();
        for _ in 0..hits {
            bubble.request_shrink(&mut world);
            for _ in 0..50 {
                bubble.advance_animation(DT, &mut world);
            }
            let size = bubble.size_fraction();
            prop_assert!(size <= previous);
            if *bubble.state() == BubbleState::Floating {
                prop_assert!(bubble.current_size() >= min_size - 1e-5);
            }
            previous = size;
        }
    }

    #[test]
    fn corner_detection_is_symmetric(
        a in any_angle(),
        b in any_angle(),
        angle in 10.0_f32..170.0,
    ) {
        let cos = angle.to_radians().cos();
        let (na, nb) = (Vec2::from_angle(a), Vec2::from_angle(b));
        prop_assert_eq!(detect_corner(&[na, nb], cos), detect_corner(&[nb, na], cos));
    }

    #[test]
    fn escape_direction_is_unit(angles in prop::collection::vec(any_angle(), 0..=4)) {
        let normals: Vec<Vec2> = angles.into_iter().map(Vec2::from_angle).collect();
        let escape = escape_direction(&normals);
        prop_assert!((escape.length() - 1.0).abs() < 1e-4, "escape = {}", escape);
    }

    #[test]
    fn bubble_speed_is_clamped(vx in -100.0_f32..100.0, vy in -100.0_f32..100.0) {
        let mut world = World::new(WorldConfig::default());
        let mut bubble = spawn_bubble(&mut world, Vec2::ZERO, BubbleConfig::default());
        world.set_velocity(bubble.body(), Vec2::new(vx, vy));

        bubble.fixed_update(DT, &mut world);

        let speed = world.velocity(bubble.body()).unwrap().length();
        prop_assert!(speed <= bubble.config().max_velocity + 1e-4, "speed = {}", speed);
    }

    #[test]
    fn pull_speed_is_capped(
        force in 0.0_f32..200.0,
        max_speed in 0.5_f32..20.0,
        distance in 0.1_f32..4.9,
        angle in any_angle(),
    ) {
        let mut world = World::new(WorldConfig::default());
        let actor = world
            .spawn(BodyDesc::dynamic_circle(BodyCategory::Player, Vec2::ZERO, 0.5))
            .unwrap();
        let bubble = spawn_bubble(
            &mut world,
            Vec2::from_angle(angle) * distance,
            BubbleConfig::default(),
        );
        let id = bubble.body();
        let mut bubbles: BTreeMap<BodyId, Bubble> = BTreeMap::from([(id, bubble)]);

        let mut field = PullField::new(PullConfig { radius: 5.0, force, max_speed });
        field.press();
        field.apply(actor, &mut bubbles, &mut world);

        let speed = world.velocity(id).unwrap().length();
        prop_assert!(speed <= max_speed + 1e-4, "speed = {}", speed);
    }
}
