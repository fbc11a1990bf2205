//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. `Tuning::default()` is the
//! stock arcade feel; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_FRAME_DT;

/// How the per-enemy fire chance relates to time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FireModel {
    /// `fire_chance` is rolled once per enemy per simulated frame, so the
    /// effective rate scales with the display refresh rate
    #[default]
    PerFrame,
    /// `fire_chance` is the per-frame chance at `fps`; each frame rolls
    /// `1 - (1 - p)^(dt * fps)` so the rate per second is refresh independent
    PerSecond { fps: f32 },
}

impl FireModel {
    /// Probability that one enemy fires during a frame of length `dt`
    pub fn chance(self, p: f32, dt: f32) -> f32 {
        match self {
            FireModel::PerFrame => p,
            FireModel::PerSecond { fps } => {
                if dt <= 0.0 {
                    0.0
                } else {
                    1.0 - (1.0 - p).powf(dt * fps)
                }
            }
        }
    }
}

/// Rejected tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must be within [0, 1] (got {value})")]
    NotProbability { field: &'static str, value: f32 },
    #[error("`{field}` must be at least 1")]
    Empty { field: &'static str },
}

/// Game balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Ship horizontal speed (px/s)
    pub player_speed: f32,
    /// Seconds between player shots
    pub fire_cooldown: f32,

    // === Projectiles ===
    pub projectile_width: f32,
    pub projectile_height: f32,
    /// Bolt speed (px/s), shared by both sides
    pub projectile_speed: f32,

    // === Formation ===
    pub enemy_rows: u32,
    /// Upper bound on columns; narrow arenas get fewer
    pub enemy_max_cols: u32,
    /// Top edge of the first row
    pub grid_top: f32,
    /// Formation speed at the start of the first wave (px/s)
    pub formation_base_speed: f32,
    /// Vertical drop on every wall bounce
    pub drop_distance: f32,
    /// Speed added on every wall bounce
    pub bounce_speed_up: f32,
    /// Base speed added for each cleared wave
    pub wave_speed_up: f32,
    /// Per-enemy fire chance (see [`FireModel`])
    pub enemy_fire_chance: f32,
    pub fire_model: FireModel,

    // === Scoring / effects ===
    pub score_per_kill: u64,
    /// Sparks per explosion
    pub burst_size: usize,

    // === Session ===
    /// Delay between clearing a wave and the next wave appearing (ms)
    pub respawn_delay_ms: f64,
    /// Clamp applied to frame deltas (s)
    pub max_frame_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 500.0,
            fire_cooldown: 0.4,

            projectile_width: 4.0,
            projectile_height: 15.0,
            projectile_speed: 600.0,

            enemy_rows: 5,
            enemy_max_cols: 8,
            grid_top: 50.0,
            formation_base_speed: 50.0,
            drop_distance: 20.0,
            bounce_speed_up: 5.0,
            wave_speed_up: 50.0,
            enemy_fire_chance: 0.0005,
            fire_model: FireModel::PerFrame,

            score_per_kill: 100,
            burst_size: 10,

            respawn_delay_ms: 1000.0,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check that every knob is in a playable range
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("fire_cooldown", self.fire_cooldown),
            ("projectile_width", self.projectile_width),
            ("projectile_height", self.projectile_height),
            ("projectile_speed", self.projectile_speed),
            ("formation_base_speed", self.formation_base_speed),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("drop_distance", self.drop_distance),
            ("bounce_speed_up", self.bounce_speed_up),
            ("wave_speed_up", self.wave_speed_up),
            ("respawn_delay_ms", self.respawn_delay_ms as f32),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.enemy_fire_chance) {
            return Err(TuningError::NotProbability {
                field: "enemy_fire_chance",
                value: self.enemy_fire_chance,
            });
        }
        if let FireModel::PerSecond { fps } = self.fire_model {
            if !(fps > 0.0) {
                return Err(TuningError::NotPositive {
                    field: "fire_model.fps",
                    value: fps,
                });
            }
        }

        if self.enemy_rows == 0 {
            return Err(TuningError::Empty { field: "enemy_rows" });
        }
        if self.enemy_max_cols == 0 {
            return Err(TuningError::Empty {
                field: "enemy_max_cols",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player_speed": 650.0, "enemy_rows": 3 }"#)
            .expect("partial tuning should parse");
        assert_eq!(tuning.player_speed, 650.0);
        assert_eq!(tuning.enemy_rows, 3);
        assert_eq!(tuning.fire_cooldown, 0.4);
        assert_eq!(tuning.score_per_kill, 100);
    }

    #[test]
    fn test_fire_model_json() {
        let tuning =
            Tuning::from_json(r#"{ "fire_model": { "mode": "per_second", "fps": 60.0 } }"#)
                .expect("fire model should parse");
        assert_eq!(tuning.fire_model, FireModel::PerSecond { fps: 60.0 });
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Tuning::from_json(r#"{ "enemy_fire_chance": 1.5 }"#),
            Err(TuningError::NotProbability { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "player_speed": -1.0 }"#),
            Err(TuningError::NotPositive { field: "player_speed", .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "enemy_rows": 0 }"#),
            Err(TuningError::Empty { .. })
        ));
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_fire_chance_per_second() {
        let p = 0.0005;
        // One 60 Hz frame is the reference frame
        let model = FireModel::PerSecond { fps: 60.0 };
        assert!((model.chance(p, 1.0 / 60.0) - p).abs() < 1e-6);
        // A 30 Hz frame covers two reference frames
        let two = 1.0 - (1.0 - p) * (1.0 - p);
        assert!((model.chance(p, 1.0 / 30.0) - two).abs() < 1e-6);
        assert_eq!(model.chance(p, 0.0), 0.0);

        assert_eq!(FireModel::PerFrame.chance(p, 1.0 / 30.0), p);
    }
}
