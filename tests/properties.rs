use proptest::prelude::*;

use neon_invaders::sim::{Arena, GameState, Player, Rect, TickInput, tick};
use neon_invaders::{FireModel, FrameClock, NullAudio, Tuning, sanitize_dt};

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, fire)| TickInput {
        left,
        right,
        fire,
    })
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (
        -500.0f32..500.0,
        -500.0f32..500.0,
        0.0f32..200.0,
        0.0f32..200.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn player_stays_inside_arena(
        width in 40.0f32..2000.0,
        steps in prop::collection::vec((input_strategy(), 0.0f32..=0.1), 1..200),
    ) {
        let arena = Arena::new(width, 600.0);
        let tuning = Tuning::default();
        let mut player = Player::new(&arena, &tuning);
        for (input, dt) in steps {
            player.update(dt, &input, arena.width);
            prop_assert!(player.pos.x >= 0.0);
            prop_assert!(player.pos.x + player.size.x <= arena.width + 1e-3);
        }
    }

    #[test]
    fn rect_overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn sanitized_dt_is_bounded(dt in any::<f32>(), max in 0.001f32..1.0) {
        let clean = sanitize_dt(dt, max);
        prop_assert!((0.0..=max).contains(&clean));
    }

    #[test]
    fn frame_clock_deltas_are_bounded(stamps in prop::collection::vec(-1e6f64..1e6, 1..50)) {
        let mut clock = FrameClock::new(0.1);
        for stamp in stamps {
            let dt = clock.advance(stamp);
            prop_assert!((0.0..=0.1).contains(&dt));
        }
    }

    #[test]
    fn per_second_fire_chance_is_a_probability(
        p in 0.0f32..=1.0,
        dt in 0.0f32..=0.1,
        fps in 1.0f32..240.0,
    ) {
        let chance = FireModel::PerSecond { fps }.chance(p, dt);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&chance));
    }

    #[test]
    fn score_only_grows(seed in any::<u64>(), frames in 1usize..300) {
        let tuning = Tuning {
            enemy_fire_chance: 0.01,
            ..Tuning::default()
        };
        let mut state = GameState::new(seed, Arena::new(800.0, 600.0), tuning);
        state.begin_session();
        let fire = TickInput { fire: true, ..TickInput::default() };
        // Within one wave; the respawn that zeroes the score is the session's
        let mut last = 0;
        for _ in 0..frames {
            tick(&mut state, &fire, 1.0 / 60.0, &NullAudio);
            prop_assert!(state.score >= last);
            prop_assert_eq!(state.score % state.tuning.score_per_kill, 0);
            last = state.score;
        }
    }
}
