//! Session driver
//!
//! Owns the [`GameState`] plus everything that lives across frames but is
//! not simulation: the frame clock, merged input, the deferred wave respawn,
//! and the outgoing event queue.

use super::autopilot;
use super::input::{Control, InputSource, InputState};
use super::state::{Arena, GameEvent, GamePhase, GameState};
use super::tick::tick;
use crate::audio::AudioSink;
use crate::clock::FrameClock;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// A wave respawn waiting for its moment
///
/// `epoch` identifies the session that scheduled it; once the player
/// restarts, the respawn belongs to a dead session and is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledRespawn {
    /// Timestamp (ms) at which the next wave appears
    pub due_ms: f64,
    pub epoch: u64,
}

/// One player's game, from title screen through any number of restarts
pub struct Session {
    state: GameState,
    clock: FrameClock,
    input: InputState,
    settings: Settings,
    /// Bumped on every start; stale respawns carry an older value
    epoch: u64,
    pending_respawn: Option<ScheduledRespawn>,
    autopilot: bool,
    outbox: Vec<GameEvent>,
}

impl Session {
    pub fn new(seed: u64, arena: Arena, tuning: Tuning, settings: Settings) -> Self {
        let clock = FrameClock::new(tuning.max_frame_dt);
        let mut state = GameState::new(seed, arena, tuning);
        state.particle_cap = settings.max_particles();
        Self {
            state,
            clock,
            input: InputState::default(),
            settings,
            epoch: 0,
            pending_respawn: None,
            autopilot: false,
            outbox: Vec::new(),
        }
    }

    /// Begin a fresh run (also used for restart)
    ///
    /// Cancels any pending wave respawn from the previous run.
    pub fn start(&mut self, now_ms: f64) {
        self.epoch += 1;
        if let Some(stale) = self.pending_respawn.take() {
            log::info!("Cancelled pending respawn due at {:.0} ms", stale.due_ms);
        }
        self.clock.reset(now_ms);
        self.input.clear();
        self.state.begin_session();
        self.collect_events(now_ms);
        log::info!("Session {} started (seed {})", self.epoch, self.state.seed);
    }

    /// Run one display frame at `now_ms`
    pub fn frame(&mut self, now_ms: f64, audio: &dyn AudioSink) {
        let dt = self.clock.advance(now_ms);
        self.poll_respawn(now_ms);

        let mut input = self.input.take();
        if self.autopilot {
            input = autopilot::steer(&self.state);
        }
        if self.state.paused {
            input.fire = false;
        }

        tick(&mut self.state, &input, dt, audio);
        self.collect_events(now_ms);
    }

    /// Fire the pending respawn if it is due
    pub fn poll_respawn(&mut self, now_ms: f64) {
        let Some(respawn) = self.pending_respawn else {
            return;
        };
        if now_ms >= respawn.due_ms {
            self.pending_respawn = None;
            self.fire_respawn(respawn);
        }
    }

    /// Apply a scheduled respawn; returns false when it was discarded
    pub fn fire_respawn(&mut self, respawn: ScheduledRespawn) -> bool {
        if respawn.epoch != self.epoch {
            log::debug!("Discarding stale respawn from session {}", respawn.epoch);
            return false;
        }
        if self.state.phase != GamePhase::Running {
            log::info!("Discarding respawn: run already over");
            return false;
        }
        if self.pending_respawn == Some(respawn) {
            self.pending_respawn = None;
        }
        self.state.advance_wave();
        log::info!(
            "Wave {} begins at {:.0} px/s",
            self.state.wave + 1,
            self.state.base_speed
        );
        self.outbox.extend(self.state.drain_events());
        true
    }

    /// Move simulation notifications to the outbox, scheduling respawns
    fn collect_events(&mut self, now_ms: f64) {
        for event in self.state.drain_events() {
            if let GameEvent::WaveCleared { .. } = event {
                if self.pending_respawn.is_none() {
                    let respawn = ScheduledRespawn {
                        due_ms: now_ms + self.state.tuning.respawn_delay_ms,
                        epoch: self.epoch,
                    };
                    log::info!("Next wave scheduled for {:.0} ms", respawn.due_ms);
                    self.pending_respawn = Some(respawn);
                }
            }
            self.outbox.push(event);
        }
    }

    /// Freeze or unfreeze a running game
    pub fn set_paused(&mut self, paused: bool) {
        if self.state.phase != GamePhase::Running || self.state.paused == paused {
            return;
        }
        self.state.paused = paused;
        if paused {
            self.input.clear();
        }
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    pub fn toggle_pause(&mut self) {
        let paused = !self.state.paused;
        self.set_paused(paused);
    }

    /// Route a control change into the merged input
    ///
    /// While paused, pressing an on-screen control resumes the game first;
    /// touch screens have no Escape key.
    pub fn control(&mut self, control: Control, source: InputSource, held: bool) {
        if held && source == InputSource::Touch && self.state.paused {
            self.set_paused(false);
        }
        self.input.apply(control, source, held);
    }

    /// New arena bounds; the current grid is kept
    pub fn resize(&mut self, arena: Arena) {
        self.state.resize(arena);
    }

    /// Swap preferences at runtime
    pub fn apply_settings(&mut self, settings: Settings) {
        self.state.particle_cap = settings.max_particles();
        self.state.particles.truncate(self.state.particle_cap);
        self.settings = settings;
    }

    pub fn set_autopilot(&mut self, on: bool) {
        if self.autopilot != on {
            log::info!("Autopilot {}", if on { "on" } else { "off" });
        }
        self.autopilot = on;
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Take all notifications since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted setups (tests, tools)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn pending_respawn(&self) -> Option<ScheduledRespawn> {
        self.pending_respawn
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn session() -> Session {
        let tuning = Tuning {
            enemy_fire_chance: 0.0,
            ..Tuning::default()
        };
        Session::new(42, Arena::new(800.0, 600.0), tuning, Settings::default())
    }

    #[test]
    fn test_start_enters_running() {
        let mut session = session();
        assert_eq!(session.phase(), GamePhase::NotStarted);
        session.start(0.0);
        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.state().enemies.len(), 40);
        let events = session.drain_events();
        assert_eq!(events[0], GameEvent::SessionStarted);
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
    }

    #[test]
    fn test_frames_before_start_do_nothing() {
        let mut session = session();
        session.input_mut().press_fire();
        session.frame(0.0, &NullAudio);
        session.frame(FRAME_MS, &NullAudio);
        assert!(session.state().projectiles.is_empty());
        assert_eq!(session.state().frames, 0);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut session = session();
        session.start(0.0);
        session.input_mut().set_right(InputSource::Keyboard, true);
        session.frame(FRAME_MS, &NullAudio);
        let x = session.state().player.pos.x;

        session.toggle_pause();
        assert!(session.state().paused);
        for i in 2..20 {
            session.frame(i as f64 * FRAME_MS, &NullAudio);
        }
        assert_eq!(session.state().player.pos.x, x);

        // Resuming does not replay the paused time as one big step
        session.toggle_pause();
        session.input_mut().set_right(InputSource::Keyboard, true);
        session.frame(20.0 * FRAME_MS, &NullAudio);
        let moved = session.state().player.pos.x - x;
        assert!(moved > 0.0 && moved < 10.0);
    }

    #[test]
    fn test_pause_ignored_when_not_running() {
        let mut session = session();
        session.toggle_pause();
        assert!(!session.state().paused);
    }

    #[test]
    fn test_touch_press_resumes_after_auto_pause() {
        let mut session = session();
        session.start(0.0);
        session.frame(FRAME_MS, &NullAudio);
        session.set_paused(true);

        // Releases and keyboard presses leave the game frozen
        session.control(Control::Left, InputSource::Touch, false);
        session.control(Control::Left, InputSource::Keyboard, true);
        assert!(session.state().paused);
        session.control(Control::Left, InputSource::Keyboard, false);

        // Tapping fire resumes and the tap still fires
        session.control(Control::Fire, InputSource::Touch, true);
        assert!(!session.state().paused);
        session.frame(2.0 * FRAME_MS, &NullAudio);
        assert_eq!(session.state().projectiles.len(), 1);
    }

    #[test]
    fn test_stale_respawn_discarded() {
        let mut session = session();
        session.start(0.0);
        let stale = ScheduledRespawn {
            due_ms: 100.0,
            epoch: session.epoch(),
        };
        session.start(50.0);
        assert!(!session.fire_respawn(stale));
        assert_eq!(session.state().wave, 0);
    }

    #[test]
    fn test_respawn_discarded_after_game_over() {
        let mut session = session();
        session.start(0.0);
        let respawn = ScheduledRespawn {
            due_ms: 100.0,
            epoch: session.epoch(),
        };
        session.state_mut().end_session();
        assert!(!session.fire_respawn(respawn));
        assert_eq!(session.state().wave, 0);
    }

    #[test]
    fn test_autopilot_drives_input() {
        let mut session = session();
        session.set_autopilot(true);
        assert!(session.autopilot());
        session.start(0.0);
        for i in 1..=120 {
            session.frame(i as f64 * FRAME_MS, &NullAudio);
        }
        // It fired at something during two seconds of play
        assert!(session.score() > 0 || !session.state().projectiles.is_empty());
    }

    #[test]
    fn test_apply_settings_trims_particles() {
        let mut session = session();
        session.start(0.0);
        let center = session.state().player.rect().center();
        session.state_mut().spawn_burst(center, crate::Color::CYAN);
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        session.apply_settings(settings);
        assert!(session.state().particles.is_empty());
        assert!(!session.settings().particles);
    }
}
