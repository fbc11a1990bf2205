//! Neon Invaders - A neon arcade invaders shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, formation, collisions, session lifecycle)
//! - `clock`: Frame clock and animation-frame loop guard
//! - `audio`: Sound trigger interface and Web Audio synthesis
//! - `renderer`: Draw-list capture and Canvas 2D painter
//! - `tuning`: Data-driven game balance
//! - `settings`: Runtime player preferences

pub mod audio;
pub mod clock;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{AudioSink, NullAudio, SoundEffect};
pub use clock::{FrameClock, FrameLoop, LoopTicket};
pub use settings::Settings;
pub use tuning::{FireModel, Tuning, TuningError};

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Largest delta time handed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arenas narrower than this use compact entity sizes
    pub const COMPACT_WIDTH_THRESHOLD: f32 = 600.0;

    /// Gap between the player ship and the bottom of the arena
    pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;

    /// Horizontal margin reserved when fitting grid columns
    pub const GRID_SIDE_MARGIN: f32 = 40.0;

    /// Spark life lost per second (life starts at 1.0)
    pub const PARTICLE_DECAY: f32 = 2.0;
    /// Half the spread of spark velocity components (px/s)
    pub const PARTICLE_SPREAD: f32 = 100.0;
    /// Rendered spark edge length
    pub const PARTICLE_SIZE: f32 = 3.0;
}

/// Packed 0xRRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    /// Player ship and player bolts
    pub const CYAN: Color = Color(0x00f3ff);
    /// Invaders and invader bolts
    pub const MAGENTA: Color = Color(0xff00ff);

    /// CSS hex string, e.g. `#00f3ff`
    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

/// Clamp a frame delta into `[0, max]`; NaN and negative values become 0
#[inline]
pub fn sanitize_dt(dt: f32, max: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max)
    }
}
