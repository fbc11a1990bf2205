//! Simulation step
//!
//! Advances the game by one display frame. The order of the phases below is
//! part of the contract: the loss check uses the formation scan taken before
//! the march, and the collision pass only sees bolts that survived their own
//! update.

use super::formation;
use super::state::{Direction, GameEvent, GamePhase, GameState};
use crate::audio::AudioSink;
use crate::sanitize_dt;

/// Merged input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move left (held)
    pub left: bool,
    /// Move right (held)
    pub right: bool,
    /// Fire (edge-triggered: true only on the frame the press arrived)
    pub fire: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, audio: &dyn AudioSink) {
    if state.phase != GamePhase::Running || state.paused {
        return;
    }
    let dt = sanitize_dt(dt, state.tuning.max_frame_dt);
    state.frames += 1;

    // Fire lands before movement, like a key press between frames
    if input.fire {
        if let Some(bolt) = state.player.shoot(&state.tuning) {
            state.projectiles.push(bolt);
            audio.on_shoot();
        }
    }

    // 1. Player
    state.player.update(dt, input, state.arena.width);

    // 2. Bolts
    let arena_height = state.arena.height;
    for bolt in &mut state.projectiles {
        bolt.update(dt, arena_height);
    }
    state.projectiles.retain(|b| b.active);

    // 3. Sparks
    for particle in &mut state.particles {
        particle.update(dt);
    }
    state.particles.retain(|p| p.is_alive());

    // 4. Formation
    let scan = formation::advance(
        &mut state.formation,
        &mut state.enemies,
        &state.arena,
        dt,
    );
    let chance = state
        .tuning
        .fire_model
        .chance(state.tuning.enemy_fire_chance, dt);
    let shots = formation::volley(&state.enemies, chance, &mut state.rng, &state.tuning);
    state.projectiles.extend(shots);

    // 5. Invaders landed
    if let Some(lowest) = scan.lowest_bottom {
        if lowest > state.player.pos.y {
            log::info!("Invaders reached the ship");
            game_over(state, audio);
            return;
        }
    }

    // 6. Collisions
    resolve_collisions(state, audio);
}

/// Bolt vs invader and bolt vs ship
fn resolve_collisions(state: &mut GameState, audio: &dyn AudioSink) {
    let mut kills = 0u32;

    for i in 0..state.projectiles.len() {
        if state.phase != GamePhase::Running {
            break;
        }
        let bolt = &state.projectiles[i];
        if !bolt.active {
            continue;
        }
        let (rect, direction) = (bolt.rect(), bolt.direction);

        match direction {
            Direction::Up => {
                let Some(j) = state
                    .enemies
                    .iter()
                    .position(|e| e.active && e.rect().intersects(&rect))
                else {
                    continue;
                };
                state.projectiles[i].active = false;
                state.enemies[j].active = false;

                let enemy = &state.enemies[j];
                let (center, color) = (enemy.rect().center(), enemy.color());
                state.spawn_burst(center, color);
                audio.on_explosion();

                state.score += state.tuning.score_per_kill;
                state.events.push(GameEvent::ScoreChanged(state.score));
                kills += 1;
            }
            Direction::Down => {
                let ship = state.player.rect();
                if !rect.intersects(&ship) {
                    continue;
                }
                state.projectiles[i].active = false;
                state.spawn_burst(ship.center(), state.player.color());
                audio.on_explosion();
                log::info!("Ship destroyed");
                game_over(state, audio);
            }
        }
    }

    if kills > 0 && state.phase == GamePhase::Running && state.all_enemies_down() {
        log::info!("Wave {} cleared (score {})", state.wave + 1, state.score);
        state.events.push(GameEvent::WaveCleared { wave: state.wave });
    }
}

/// Transition to `GameOver`; side effects fire only on the first call
fn game_over(state: &mut GameState, audio: &dyn AudioSink) {
    if state.end_session() {
        audio.on_game_over();
        log::info!("Game over - final score {}", state.score);
    }
}
