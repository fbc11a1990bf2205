use neon_invaders::audio::{SoundEffect, SoundLog};
use neon_invaders::sim::{Arena, Direction, GameEvent, GamePhase, Projectile, Session};
use neon_invaders::{AudioSink, NullAudio, Settings, Tuning};

const FRAME_MS: f64 = 1000.0 / 60.0;

/// One row of three stationary invaders, no return fire
fn three_by_one() -> Tuning {
    Tuning {
        enemy_rows: 1,
        enemy_max_cols: 3,
        enemy_fire_chance: 0.0,
        formation_base_speed: 0.0,
        ..Tuning::default()
    }
}

struct Driver {
    session: Session,
    now: f64,
}

impl Driver {
    fn new(tuning: Tuning) -> Self {
        let mut session = Session::new(7, Arena::new(800.0, 600.0), tuning, Settings::default());
        session.start(0.0);
        Self { session, now: 0.0 }
    }

    fn run(&mut self, frames: u32, audio: &dyn AudioSink) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            self.now += FRAME_MS;
            self.session.frame(self.now, audio);
            events.extend(self.session.drain_events());
        }
        events
    }

    /// Park the ship under `center_x` and fire once
    fn shoot_at(&mut self, center_x: f32) {
        let player = &mut self.session.state_mut().player;
        player.pos.x = center_x - player.size.x / 2.0;
        self.session.input_mut().press_fire();
    }

    fn clear_wave(&mut self, audio: &SoundLog) -> Vec<GameEvent> {
        let targets: Vec<f32> = self
            .session
            .state()
            .enemies
            .iter()
            .map(|e| e.rect().center().x)
            .collect();
        let mut events = Vec::new();
        for x in targets {
            self.shoot_at(x);
            events.extend(self.run(60, audio));
        }
        events
    }
}

#[test]
fn clearing_the_grid_scores_and_respawns_fresh() {
    let mut driver = Driver::new(three_by_one());
    driver.session.drain_events();
    assert_eq!(driver.session.state().enemies.len(), 3);

    let sounds = SoundLog::default();
    let events = driver.clear_wave(&sounds);

    assert_eq!(driver.session.score(), 300);
    assert_eq!(driver.session.state().active_enemies(), 0);
    assert_eq!(sounds.count(SoundEffect::Shoot), 3);
    assert_eq!(sounds.count(SoundEffect::Explosion), 3);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveCleared { wave: 0 }))
            .count(),
        1
    );

    let respawn = driver
        .session
        .pending_respawn()
        .expect("respawn scheduled after clear");
    assert!(respawn.due_ms > driver.now - 1000.0);
    assert!(respawn.due_ms <= driver.now + 1000.0);
    assert_eq!(respawn.epoch, driver.session.epoch());

    // Let the delay run out
    let events = driver.run(70, &sounds);
    assert!(events.contains(&GameEvent::WaveStarted { wave: 1 }));
    // The new wave is a fresh run: score starts over, the speed-up stays
    assert!(events.contains(&GameEvent::ScoreChanged(0)));
    let state = driver.session.state();
    assert_eq!(state.wave, 1);
    assert_eq!(state.active_enemies(), 3);
    assert_eq!(state.score, 0);
    assert_eq!(state.base_speed, 50.0);
    assert!(driver.session.pending_respawn().is_none());
}

#[test]
fn invaders_landing_ends_the_game_once() {
    let tuning = Tuning {
        grid_top: 530.0,
        enemy_fire_chance: 0.0,
        ..Tuning::default()
    };
    let mut driver = Driver::new(tuning);
    driver.session.drain_events();

    let sounds = SoundLog::default();
    let events = driver.run(30, &sounds);

    assert_eq!(driver.session.phase(), GamePhase::GameOver);
    assert_eq!(sounds.count(SoundEffect::GameOver), 1);
    let overs: Vec<&GameEvent> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .collect();
    assert_eq!(overs, vec![&GameEvent::GameOver { final_score: 0 }]);

    // Nothing moves after the run ended
    let frames = driver.session.state().frames;
    driver.run(10, &sounds);
    assert_eq!(driver.session.state().frames, frames);
}

#[test]
fn restart_during_pending_respawn_builds_one_grid() {
    let mut driver = Driver::new(three_by_one());
    let sounds = SoundLog::default();
    driver.clear_wave(&sounds);
    let stale = driver
        .session
        .pending_respawn()
        .expect("respawn scheduled after clear");

    // Player restarts before the respawn fires
    driver.session.start(driver.now);
    driver.session.drain_events();
    assert!(driver.session.pending_respawn().is_none());
    let grid: Vec<_> = driver
        .session
        .state()
        .enemies
        .iter()
        .map(|e| e.pos)
        .collect();
    assert_eq!(grid.len(), 3);

    // Well past the old due time
    let events = driver.run(120, &NullAudio);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::WaveStarted { .. })));
    let state = driver.session.state();
    assert_eq!(state.wave, 0);
    assert_eq!(state.enemies.len(), 3);
    assert_eq!(state.active_enemies(), 3);
    assert_eq!(state.score, 0);

    // Replaying the stale respawn by hand is refused as well
    assert!(!driver.session.fire_respawn(stale));
    assert_eq!(driver.session.state().wave, 0);
}

#[test]
fn game_over_while_respawn_pending_discards_it() {
    let mut driver = Driver::new(three_by_one());
    let sounds = SoundLog::default();
    driver.clear_wave(&sounds);
    assert!(driver.session.pending_respawn().is_some());

    // An invader bolt already in flight lands on the ship
    let ship = driver.session.state().player.rect();
    let bolt = Projectile::spawn(
        ship.center().x,
        ship.top() - 5.0,
        Direction::Down,
        &driver.session.state().tuning,
    );
    driver.session.state_mut().projectiles.push(bolt);
    driver.run(1, &sounds);
    assert_eq!(driver.session.phase(), GamePhase::GameOver);

    let events = driver.run(120, &sounds);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::WaveStarted { .. })));
    assert_eq!(driver.session.state().wave, 0);
    assert_eq!(driver.session.state().active_enemies(), 0);
    assert!(driver.session.pending_respawn().is_none());
    assert_eq!(sounds.count(SoundEffect::GameOver), 1);
}

#[test]
fn same_seed_same_run() {
    let tuning = Tuning {
        enemy_fire_chance: 0.01,
        ..Tuning::default()
    };
    let play = || {
        let mut session = Session::new(
            2024,
            Arena::new(800.0, 600.0),
            tuning.clone(),
            Settings::default(),
        );
        session.set_autopilot(true);
        session.start(0.0);
        for i in 1..=600 {
            session.frame(i as f64 * FRAME_MS, &NullAudio);
        }
        let state = session.state();
        (
            state.score,
            state.phase,
            state.frames,
            state.player.pos,
            state.enemies.iter().filter(|e| e.active).count(),
        )
    };
    assert_eq!(play(), play());
}
