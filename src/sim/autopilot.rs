//! Demo/idle mode - the game plays itself
//!
//! Dodges bolts that are about to land on the ship, otherwise lines up under
//! the nearest low invader (leading the formation's march) and fires.

use super::geometry::Rect;
use super::state::{Direction, GamePhase, GameState};
use super::tick::TickInput;

/// How far above the ship an incoming bolt counts as a threat (px)
const THREAT_RANGE: f32 = 160.0;
/// Extra clearance around the ship when judging threats (px)
const THREAT_MARGIN: f32 = 6.0;
/// Ignore alignment errors smaller than this (px)
const DEADBAND: f32 = 4.0;

/// Pick controls for the next frame
pub fn steer(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    if state.phase != GamePhase::Running {
        return input;
    }

    let ship = state.player.rect();
    let ship_x = ship.center().x;

    // Dodge first
    let threat = state
        .projectiles
        .iter()
        .filter(|b| b.active && b.direction == Direction::Down)
        .map(|b| b.rect())
        .filter(|r| r.bottom() <= ship.top() + 1.0 && ship.top() - r.bottom() < THREAT_RANGE)
        .find(|r| {
            r.right() >= ship.left() - THREAT_MARGIN && r.left() <= ship.right() + THREAT_MARGIN
        });
    if let Some(bolt) = threat {
        let room_left = ship.left();
        let room_right = state.arena.width - ship.right();
        let go_left = if bolt.center().x > ship_x {
            room_left > ship.size.x
        } else {
            room_right <= ship.size.x
        };
        input.left = go_left;
        input.right = !go_left;
        return input;
    }

    // Hunt the lowest invader closest to the ship
    let target = state
        .enemies
        .iter()
        .filter(|e| e.active)
        .map(|e| e.rect())
        .max_by(|a, b| {
            let score = |r: &Rect| r.bottom() - (r.center().x - ship_x).abs() * 0.5;
            score(a).total_cmp(&score(b))
        });
    let Some(target) = target else {
        return input;
    };

    // Lead the formation by the bolt's flight time
    let flight = (ship.top() - target.bottom()).max(0.0) / state.tuning.projectile_speed;
    let lead = state.formation.speed * state.formation.march.sign() * flight;
    let aim_x = (target.center().x + lead).clamp(0.0, state.arena.width);

    let error = aim_x - ship_x;
    if error < -DEADBAND {
        input.left = true;
    } else if error > DEADBAND {
        input.right = true;
    }
    input.fire = error.abs() < target.size.x / 2.0 && state.player.can_fire();
    input
}
