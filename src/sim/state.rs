//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]. Entities are
//! plain records; nothing holds a reference to another entity.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::formation::build_grid;
use super::geometry::Rect;
use super::tick::TickInput;
use crate::Color;
use crate::consts::*;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    NotStarted,
    /// Active gameplay
    Running,
    /// Run ended; terminal until the next start
    GameOver,
}

/// Notifications for the HUD and the session driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new session began (score reset to 0)
    SessionStarted,
    /// Score changed to the given total
    ScoreChanged(u64),
    /// Last invader of the wave destroyed
    WaveCleared { wave: u32 },
    /// A fresh grid appeared
    WaveStarted { wave: u32 },
    /// Run ended
    GameOver { final_score: u64 },
}

/// Entity sizing bucket, picked from the arena width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    /// Narrow (phone) arenas
    Compact,
    Regular,
}

/// Play area bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn size_class(&self) -> SizeClass {
        if self.width < COMPACT_WIDTH_THRESHOLD {
            SizeClass::Compact
        } else {
            SizeClass::Regular
        }
    }

    /// Player ship dimensions
    pub fn player_size(&self) -> Vec2 {
        match self.size_class() {
            SizeClass::Compact => Vec2::new(30.0, 22.0),
            SizeClass::Regular => Vec2::new(40.0, 30.0),
        }
    }

    /// Invader edge length
    pub fn enemy_size(&self) -> f32 {
        match self.size_class() {
            SizeClass::Compact => 20.0,
            SizeClass::Regular => 30.0,
        }
    }

    /// Gap between neighbouring invaders
    pub fn enemy_padding(&self) -> f32 {
        match self.size_class() {
            SizeClass::Compact => 10.0,
            SizeClass::Regular => 20.0,
        }
    }

    /// Grid columns that fit, capped at `max_cols` (never fewer than one)
    pub fn grid_columns(&self, max_cols: u32) -> u32 {
        let stride = self.enemy_size() + self.enemy_padding();
        let fit = ((self.width - GRID_SIDE_MARGIN) / stride).floor();
        let fit = if fit.is_finite() && fit > 0.0 { fit as u32 } else { 0 };
        fit.min(max_cols).max(1)
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed (px/s)
    pub speed: f32,
    /// Seconds until the next shot; ready when <= 0
    pub cooldown: f32,
    /// Cooldown applied after each shot
    pub fire_interval: f32,
}

impl Player {
    /// Centred ship resting just above the bottom edge
    pub fn new(arena: &Arena, tuning: &Tuning) -> Self {
        let size = arena.player_size();
        Self {
            pos: Vec2::new(
                arena.width / 2.0 - size.x / 2.0,
                arena.height - size.y - PLAYER_BOTTOM_MARGIN,
            ),
            size,
            speed: tuning.player_speed,
            cooldown: 0.0,
            fire_interval: tuning.fire_cooldown,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn color(&self) -> Color {
        Color::CYAN
    }

    /// Apply held input, keep inside the arena, run down the cooldown
    pub fn update(&mut self, dt: f32, input: &TickInput, arena_width: f32) {
        let dt = dt.max(0.0);
        if input.left {
            self.pos.x -= self.speed * dt;
        }
        if input.right {
            self.pos.x += self.speed * dt;
        }
        self.clamp_to(arena_width);

        if self.cooldown > 0.0 {
            self.cooldown -= dt;
        }
    }

    /// Keep the ship fully inside `[0, arena_width]`
    pub fn clamp_to(&mut self, arena_width: f32) {
        let max_x = (arena_width - self.size.x).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Fire one bolt from the nose of the ship; `None` while cooling down
    pub fn shoot(&mut self, tuning: &Tuning) -> Option<Projectile> {
        if !self.can_fire() {
            return None;
        }
        self.cooldown = self.fire_interval;
        Some(Projectile::spawn(
            self.pos.x + self.size.x / 2.0,
            self.pos.y,
            Direction::Up,
            tuning,
        ))
    }
}

/// Vertical travel direction of a bolt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Fired by the player, threatens invaders
    Up,
    /// Fired by invaders, threatens the player
    Down,
}

impl Direction {
    /// -1 for up, +1 for down (screen y grows downward)
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
        }
    }
}

/// A bolt in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub direction: Direction,
    pub active: bool,
}

impl Projectile {
    /// Bolt horizontally centred on `center_x` with its top edge at `top`
    pub fn spawn(center_x: f32, top: f32, direction: Direction, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(center_x - tuning.projectile_width / 2.0, top),
            size: Vec2::new(tuning.projectile_width, tuning.projectile_height),
            speed: tuning.projectile_speed,
            direction,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn color(&self) -> Color {
        match self.direction {
            Direction::Up => Color::CYAN,
            Direction::Down => Color::MAGENTA,
        }
    }

    /// Move along y; deactivate once outside `[0, arena_height]`
    pub fn update(&mut self, dt: f32, arena_height: f32) {
        let dt = dt.max(0.0);
        self.pos.y += self.speed * self.direction.sign() * dt;
        if self.pos.y < 0.0 || self.pos.y > arena_height {
            self.active = false;
        }
    }
}

/// Invader silhouette (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Squid,
    Crab,
    Octopus,
}

impl EnemyKind {
    /// Rows cycle through the three silhouettes
    pub fn for_row(row: u32) -> Self {
        match row % 3 {
            0 => EnemyKind::Squid,
            1 => EnemyKind::Crab,
            _ => EnemyKind::Octopus,
        }
    }
}

/// A single invader in the formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: EnemyKind,
    pub active: bool,
}

impl Enemy {
    pub fn new(x: f32, y: f32, size: f32, kind: EnemyKind) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::splat(size),
            kind,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn color(&self) -> Color {
        Color::MAGENTA
    }
}

/// A spark for explosion effects (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at birth, dead at <= 0
    pub life: f32,
    pub color: Color,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.pos += self.vel * dt;
        self.life -= PARTICLE_DECAY * dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Horizontal march direction shared by the whole formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum March {
    Left,
    Right,
}

impl March {
    pub fn sign(self) -> f32 {
        match self {
            March::Left => -1.0,
            March::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            March::Left => March::Right,
            March::Right => March::Left,
        }
    }
}

/// Collective movement state for every invader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub march: March,
    /// Shared horizontal speed (px/s)
    pub speed: f32,
    /// Vertical drop on each wall bounce
    pub drop_distance: f32,
    /// Speed gained on each wall bounce
    pub bounce_speed_up: f32,
}

impl Formation {
    /// Marching right at `speed`, with the bounce policy from `tuning`
    pub fn new(speed: f32, tuning: &Tuning) -> Self {
        Self {
            march: March::Right,
            speed,
            drop_distance: tuning.drop_distance,
            bounce_speed_up: tuning.bounce_speed_up,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for this run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub arena: Arena,
    pub phase: GamePhase,
    /// Simulation frozen; timestamps still flow
    pub paused: bool,
    pub score: u64,
    /// Wave index within the session (0-based)
    pub wave: u32,
    /// Formation speed each new wave starts at
    pub base_speed: f32,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    /// Stable grid order; destroyed invaders stay with `active = false`
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub formation: Formation,
    /// Live spark budget
    pub particle_cap: usize,
    /// Simulated frames since the session started
    pub frames: u64,
    /// Pending notifications, drained by the session driver
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Idle state on the title screen: a ship, no invaders
    pub fn new(seed: u64, arena: Arena, tuning: Tuning) -> Self {
        let player = Player::new(&arena, &tuning);
        let formation = Formation::new(tuning.formation_base_speed, &tuning);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            base_speed: tuning.formation_base_speed,
            tuning,
            arena,
            phase: GamePhase::NotStarted,
            paused: false,
            score: 0,
            wave: 0,
            player,
            projectiles: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            formation,
            particle_cap: crate::settings::MAX_PARTICLES,
            frames: 0,
            events: Vec::new(),
        }
    }

    /// Reset everything for a fresh run and enter `Running`
    pub fn begin_session(&mut self) {
        self.score = 0;
        self.wave = 0;
        self.frames = 0;
        self.paused = false;
        self.base_speed = self.tuning.formation_base_speed;
        self.events.push(GameEvent::SessionStarted);
        self.events.push(GameEvent::ScoreChanged(0));
        self.spawn_wave();
        self.phase = GamePhase::Running;
    }

    /// Re-initialize the run after a cleared grid
    ///
    /// Score starts over from zero; the faster base speed and the wave
    /// counter are what carry across.
    pub fn advance_wave(&mut self) {
        self.wave += 1;
        self.base_speed += self.tuning.wave_speed_up;
        self.score = 0;
        self.events.push(GameEvent::ScoreChanged(0));
        self.spawn_wave();
    }

    /// Fresh ship, empty skies, full grid marching right at `base_speed`
    fn spawn_wave(&mut self) {
        self.player = Player::new(&self.arena, &self.tuning);
        self.projectiles.clear();
        self.particles.clear();
        self.enemies = build_grid(&self.arena, &self.tuning);
        self.formation = Formation::new(self.base_speed, &self.tuning);
        self.events.push(GameEvent::WaveStarted { wave: self.wave });
    }

    /// Enter `GameOver`; returns false if the run had already ended
    pub fn end_session(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
        });
        true
    }

    /// Adopt new arena bounds; keeps the grid, re-seats the ship
    pub fn resize(&mut self, arena: Arena) {
        self.arena = arena;
        self.player.pos.y = arena.height - self.player.size.y - PLAYER_BOTTOM_MARGIN;
        self.player.clamp_to(arena.width);
    }

    pub fn active_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn all_enemies_down(&self) -> bool {
        self.enemies.iter().all(|e| !e.active)
    }

    /// Spray sparks from `center` (respects `particle_cap`)
    pub fn spawn_burst(&mut self, center: Vec2, color: Color) {
        let room = self.particle_cap.saturating_sub(self.particles.len());
        let count = self.tuning.burst_size.min(room);
        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.random_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
                self.rng.random_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
            );
            self.particles.push(Particle {
                pos: center,
                vel,
                life: 1.0,
                color,
            });
        }
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
