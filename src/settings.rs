//! Player preferences
//!
//! Runtime-only: nothing here is written to storage.

use serde::{Deserialize, Serialize};

/// Hard ceiling on live sparks regardless of settings
pub const MAX_PARTICLES: usize = 512;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Silence all sound effects
    pub muted: bool,

    // === Visual Effects ===
    /// Explosion sparks
    pub particles: bool,
    /// Spark budget when particles are on
    pub particle_limit: usize,

    // === Behaviour ===
    /// Pause when the tab is hidden or the window loses focus
    pub auto_pause: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
            particles: true,
            particle_limit: 300,
            auto_pause: true,
        }
    }
}

impl Settings {
    /// Parse settings JSON, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Volume actually applied to the mixer
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.particle_limit.min(MAX_PARTICLES)
        }
    }
}
