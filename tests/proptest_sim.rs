//! Property tests for the simulation invariants

use blast_runner::Tuning;
use blast_runner::sim::chain::ENEMY_BURST_COLOR;
use blast_runner::sim::{
    Body, Crate, GameEvent, GameState, Generator, Rect, Target, TickInput, World, detonate, overlaps, resolve, tick,
};
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

const DT: f32 = 1.0 / 60.0;

fn generated(seed: u64, to_x: f32) -> (Generator, World, Tuning) {
    let tuning = Tuning::default();
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut world = World::default();
    let mut generator = Generator::new(tuning.world_start_x);
    generator.extend(to_x, &mut world, &mut rng, &tuning);
    (generator, world, tuning)
}

fn assert_spaced(mut xs: Vec<f32>, min: f32) -> Result<(), TestCaseError> {
    xs.sort_by(f32::total_cmp);
    for pair in xs.windows(2) {
        prop_assert!(pair[1] - pair[0] >= min - 1e-3, "{} then {} closer than {}", pair[0], pair[1], min);
    }
    Ok(())
}

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, jump, dash)| TickInput {
        left,
        right,
        jump,
        dash,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_spawn_spacing_holds(seed in any::<u64>()) {
        let (_, world, tuning) = generated(seed, 20_000.0);
        assert_spaced(world.enemies.iter().map(|e| e.pos.x).collect(), tuning.min_enemy_spacing)?;
        assert_spaced(world.walls.iter().map(|w| w.rect.x).collect(), tuning.min_wall_spacing)?;
        assert_spaced(world.hoops.iter().map(|h| h.center.x).collect(), tuning.min_hoop_spacing)?;
    }

    #[test]
    fn prop_nothing_hostile_before_safe_start(seed in any::<u64>()) {
        let (_, world, tuning) = generated(seed, 6_000.0);
        prop_assert!(world.enemies.iter().all(|e| e.pos.x >= tuning.safe_start_x));
        prop_assert!(world.walls.iter().all(|w| w.rect.x >= tuning.safe_start_x));
    }

    #[test]
    fn prop_frontier_never_retreats(
        seed in any::<u64>(),
        targets in prop::collection::vec(-1_000.0f32..30_000.0, 1..20),
    ) {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut world = World::default();
        let mut generator = Generator::new(tuning.world_start_x);

        let mut last = generator.frontier;
        for to_x in targets {
            generator.extend(to_x, &mut world, &mut rng, &tuning);
            prop_assert!(generator.frontier >= last);
            prop_assert!(generator.frontier >= to_x);
            last = generator.frontier;
        }
    }

    #[test]
    fn prop_resolve_separates_and_is_idempotent(
        (bx, by) in (-500i32..500, -500i32..500),
        size in 1i32..120,
        (ox, oy, ow, oh) in (-500i32..500, -500i32..500, 1i32..300, 1i32..300),
        (vx, vy) in (-900i32..900, -900i32..900),
    ) {
        let mut body = Crate::new(1, Vec2::new(bx as f32, by as f32), size as f32);
        body.vel = Vec2::new(vx as f32, vy as f32);
        let obstacle = Rect::new(ox as f32, oy as f32, ow as f32, oh as f32);

        resolve(&mut body, &obstacle);
        prop_assert!(!overlaps(&body.rect(), &obstacle));

        let (pos, vel) = (body.pos, body.vel);
        prop_assert!(resolve(&mut body, &obstacle).is_none());
        prop_assert_eq!(body.pos, pos);
        prop_assert_eq!(body.vel, vel);
    }

    #[test]
    fn prop_player_speed_capped(
        seed in 0u64..1_000,
        inputs in prop::collection::vec(input_strategy(), 1..240),
    ) {
        let mut state = GameState::new(seed);
        for input in &inputs {
            tick(&mut state, input, DT);
            let cap = state.tuning.max_speed(input.dash);
            prop_assert!(state.player.vel.x.abs() <= cap + 1e-3);
        }
    }

    #[test]
    fn prop_each_enemy_detonates_at_most_once(
        seed in 0u64..1_000,
        offsets in prop::collection::vec(0.0f32..160.0, 2..6),
    ) {
        let mut state = GameState::new(seed);
        state.world.enemies.clear();
        state.world.crates.clear();
        let size = Vec2::new(state.tuning.enemy_width, state.tuning.enemy_height);
        let y = state.tuning.ground_y - size.y;
        let ids: Vec<u32> = offsets
            .iter()
            .map(|dx| state.world.spawn_enemy(Vec2::new(260.0 + dx, y), size))
            .collect();
        state.events.clear();

        detonate(&mut state, Target::Enemy(ids[0]), true);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }

        let bursts = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ParticleBurst { color, .. } if *color == ENEMY_BURST_COLOR))
            .count();
        prop_assert!(bursts >= 1);
        prop_assert!(bursts <= ids.len());
    }
}
