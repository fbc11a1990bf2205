//! Draw-list capture

use glam::Vec2;

use crate::Color;
use crate::consts::PARTICLE_SIZE;
use crate::sim::{EnemyKind, GamePhase, GameState, Rect};

/// Glow radius around the ship and bolts
pub const GLOW_STRONG: f32 = 10.0;
/// Glow radius around invaders
pub const GLOW_SOFT: f32 = 5.0;

/// Outline a sprite is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Stroked arrowhead with a notched tail
    Ship,
    /// Filled bar
    Bolt,
    /// Stroked silhouette per invader kind
    Invader(EnemyKind),
    /// Small filled square
    Spark,
}

/// One thing to paint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub shape: Shape,
    pub rect: Rect,
    pub color: Color,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
    /// Shadow blur radius (0 = no glow)
    pub glow: f32,
}

/// Everything visible in one frame, in paint order
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub width: f32,
    pub height: f32,
    pub sprites: Vec<Sprite>,
    pub paused: bool,
}

impl RenderFrame {
    /// Snapshot the drawable parts of `state`
    ///
    /// Order: ship, bolts, invaders, sparks. Destroyed invaders and spent
    /// bolts are skipped; nothing but the backdrop is drawn before the first
    /// start.
    pub fn capture(state: &GameState) -> Self {
        let mut sprites = Vec::with_capacity(
            1 + state.projectiles.len() + state.enemies.len() + state.particles.len(),
        );

        if state.phase != GamePhase::NotStarted {
            let player = &state.player;
            sprites.push(Sprite {
                shape: Shape::Ship,
                rect: player.rect(),
                color: player.color(),
                alpha: 1.0,
                glow: GLOW_STRONG,
            });
        }

        sprites.extend(state.projectiles.iter().filter(|b| b.active).map(|b| Sprite {
            shape: Shape::Bolt,
            rect: b.rect(),
            color: b.color(),
            alpha: 1.0,
            glow: GLOW_STRONG,
        }));

        sprites.extend(state.enemies.iter().filter(|e| e.active).map(|e| Sprite {
            shape: Shape::Invader(e.kind),
            rect: e.rect(),
            color: e.color(),
            alpha: 1.0,
            glow: GLOW_SOFT,
        }));

        sprites.extend(state.particles.iter().map(|p| Sprite {
            shape: Shape::Spark,
            rect: Rect {
                pos: p.pos,
                size: Vec2::splat(PARTICLE_SIZE),
            },
            color: p.color,
            alpha: p.life.clamp(0.0, 1.0),
            glow: 0.0,
        }));

        Self {
            width: state.arena.width,
            height: state.arena.height,
            sprites,
            paused: state.paused,
        }
    }

    /// Sprites of one shape
    pub fn count(&self, shape: Shape) -> usize {
        self.sprites.iter().filter(|s| s.shape == shape).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Arena, Direction, Projectile};
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(5, Arena::new(800.0, 600.0), Tuning::default())
    }

    #[test]
    fn test_title_screen_is_empty() {
        let frame = RenderFrame::capture(&state());
        assert!(frame.sprites.is_empty());
        assert_eq!((frame.width, frame.height), (800.0, 600.0));
    }

    #[test]
    fn test_capture_order_and_filtering() {
        let mut state = state();
        state.begin_session();
        state.enemies[3].active = false;
        let mut spent = Projectile::spawn(100.0, 300.0, Direction::Up, &state.tuning);
        spent.active = false;
        state.projectiles.push(spent);
        state
            .projectiles
            .push(Projectile::spawn(200.0, 300.0, Direction::Down, &state.tuning));
        let center = state.player.rect().center();
        state.spawn_burst(center, Color::CYAN);

        let frame = RenderFrame::capture(&state);
        assert_eq!(frame.sprites[0].shape, Shape::Ship);
        assert_eq!(frame.sprites[1].shape, Shape::Bolt);
        assert_eq!(frame.sprites[1].color, Color::MAGENTA);
        assert_eq!(frame.count(Shape::Bolt), 1);
        assert_eq!(frame.count(Shape::Invader(EnemyKind::Squid)), 7 + 8);
        assert_eq!(frame.count(Shape::Spark), 10);
        assert!(matches!(
            frame.sprites.last().map(|s| s.shape),
            Some(Shape::Spark)
        ));
    }

    #[test]
    fn test_spark_alpha_follows_life() {
        let mut state = state();
        state.begin_session();
        state.spawn_burst(Vec2::new(50.0, 50.0), Color::MAGENTA);
        state.particles[0].life = 0.25;
        state.particles[1].life = -0.5;
        let frame = RenderFrame::capture(&state);
        let sparks: Vec<&Sprite> = frame
            .sprites
            .iter()
            .filter(|s| s.shape == Shape::Spark)
            .collect();
        assert_eq!(sparks[0].alpha, 0.25);
        assert_eq!(sparks[1].alpha, 0.0);
        assert_eq!(sparks[0].rect.size, Vec2::splat(PARTICLE_SIZE));
        assert_eq!(sparks[0].glow, 0.0);
    }
}
