//! Invader formation controller
//!
//! The grid moves as one body: a single direction and speed shared by every
//! live invader. Touching a side wall reverses the march, drops the whole
//! formation, and speeds it up.

use rand::Rng;

use super::state::{Arena, Direction, Enemy, EnemyKind, Formation, March, Projectile};
use crate::tuning::Tuning;

/// What the pre-move scan saw
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormationScan {
    /// Live invaders
    pub active: usize,
    /// Lowest bottom edge among live invaders
    pub lowest_bottom: Option<f32>,
    /// The lead edge reached a wall this frame
    pub bounced: bool,
}

/// Lay out a fresh, centred invader grid for `arena`
pub fn build_grid(arena: &Arena, tuning: &Tuning) -> Vec<Enemy> {
    let size = arena.enemy_size();
    let stride = size + arena.enemy_padding();
    let cols = arena.grid_columns(tuning.enemy_max_cols);
    let rows = tuning.enemy_rows;

    let grid_width = cols as f32 * stride - arena.enemy_padding();
    let start_x = (arena.width - grid_width) / 2.0;

    let mut enemies = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            enemies.push(Enemy::new(
                start_x + col as f32 * stride,
                tuning.grid_top + row as f32 * stride,
                size,
                EnemyKind::for_row(row),
            ));
        }
    }
    enemies
}

/// Bounce check, collective drop/speed-up, then horizontal march
pub fn advance(
    formation: &mut Formation,
    enemies: &mut [Enemy],
    arena: &Arena,
    dt: f32,
) -> FormationScan {
    let mut scan = FormationScan::default();

    for enemy in enemies.iter().filter(|e| e.active) {
        scan.active += 1;
        let rect = enemy.rect();
        let at_wall = match formation.march {
            March::Right => rect.right() >= arena.width,
            March::Left => rect.left() <= 0.0,
        };
        scan.bounced |= at_wall;
        scan.lowest_bottom = Some(match scan.lowest_bottom {
            Some(lowest) => lowest.max(rect.bottom()),
            None => rect.bottom(),
        });
    }

    if scan.bounced {
        formation.march = formation.march.reversed();
        formation.speed += formation.bounce_speed_up;
        for enemy in enemies.iter_mut().filter(|e| e.active) {
            enemy.pos.y += formation.drop_distance;
        }
    }

    let dx = formation.speed * formation.march.sign() * dt.max(0.0);
    for enemy in enemies.iter_mut().filter(|e| e.active) {
        enemy.pos.x += dx;
    }

    scan
}

/// Independent per-invader fire roll; returns the bolts fired
///
/// Each live invader fires with probability `chance` from its bottom centre.
pub fn volley<R: Rng>(
    enemies: &[Enemy],
    chance: f32,
    rng: &mut R,
    tuning: &Tuning,
) -> Vec<Projectile> {
    if chance <= 0.0 {
        return Vec::new();
    }
    enemies
        .iter()
        .filter(|e| e.active)
        .filter_map(|enemy| {
            if rng.random::<f32>() < chance {
                let rect = enemy.rect();
                Some(Projectile::spawn(rect.center().x, rect.bottom(), Direction::Down, tuning))
            } else {
                None
            }
        })
        .collect()
}
