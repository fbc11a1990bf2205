//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM,
//! the canvas, or the audio device:
//! - Variable timestep, clamped by the frame clock
//! - Seeded RNG only (same seed and inputs, same run)
//! - Stable iteration order (grid order for invaders, spawn order for bolts)
//! - Side effects leave through [`AudioSink`](crate::audio::AudioSink) and
//!   [`GameEvent`]s

pub mod autopilot;
pub mod formation;
pub mod geometry;
pub mod input;
pub mod session;
pub mod state;
pub mod tick;

pub use formation::{FormationScan, advance, build_grid, volley};
pub use geometry::Rect;
pub use input::{Control, InputSource, InputState};
pub use session::{ScheduledRespawn, Session};
pub use state::{
    Arena, Direction, Enemy, EnemyKind, Formation, GameEvent, GamePhase, GameState, March,
    Particle, Player, Projectile, SizeClass,
};
pub use tick::{TickInput, tick};
