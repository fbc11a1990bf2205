//! Sound triggers
//!
//! The simulation only knows [`AudioSink`]: three fire-and-forget triggers.
//! In the browser they are backed by [`WebAudio`], which synthesizes every
//! effect with the Web Audio API (no sound files). Headless runs and tests
//! use [`NullAudio`] or [`SoundLog`].

use std::cell::RefCell;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player bolt fired
    Shoot,
    /// Something blew up
    Explosion,
    /// Run ended
    GameOver,
}

/// Receiver for gameplay sound triggers
///
/// Calls must return immediately and must never panic; the simulation does
/// not wait for, or sequence on, playback.
pub trait AudioSink {
    fn on_shoot(&self);
    fn on_explosion(&self);
    fn on_game_over(&self);
}

/// Silent sink
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn on_shoot(&self) {}
    fn on_explosion(&self) {}
    fn on_game_over(&self) {}
}

/// Sink that records every trigger in order
#[derive(Debug, Default)]
pub struct SoundLog {
    played: RefCell<Vec<SoundEffect>>,
}

impl SoundLog {
    /// How many times `effect` was triggered
    pub fn count(&self, effect: SoundEffect) -> usize {
        self.played.borrow().iter().filter(|e| **e == effect).count()
    }

    pub fn len(&self) -> usize {
        self.played.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.borrow().is_empty()
    }

    /// Take the recorded triggers, leaving the log empty
    pub fn take(&self) -> Vec<SoundEffect> {
        std::mem::take(&mut *self.played.borrow_mut())
    }

    fn push(&self, effect: SoundEffect) {
        self.played.borrow_mut().push(effect);
    }
}

impl AudioSink for SoundLog {
    fn on_shoot(&self) {
        self.push(SoundEffect::Shoot);
    }

    fn on_explosion(&self) {
        self.push(SoundEffect::Explosion);
    }

    fn on_game_over(&self) {
        self.push(SoundEffect::GameOver);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use web_sys::{
        AudioContext, AudioContextState, BiquadFilterType, GainNode, OscillatorNode,
        OscillatorType,
    };

    use super::{AudioSink, SoundEffect};
    use crate::settings::Settings;

    /// Master level before the player's volume setting
    const MASTER_LEVEL: f32 = 0.3;

    /// Web Audio synthesizer
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        master: Option<GainNode>,
        volume: Cell<f32>,
        noise: RefCell<Pcg32>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let master = ctx.as_ref().and_then(|ctx| {
                let gain = ctx.create_gain().ok()?;
                gain.gain().set_value(MASTER_LEVEL);
                gain.connect_with_audio_node(&ctx.destination()).ok()?;
                Some(gain)
            });
            Self {
                ctx,
                master,
                volume: Cell::new(1.0),
                noise: RefCell::new(Pcg32::seed_from_u64(0x0e0_5eed)),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        /// Apply volume/mute preferences
        pub fn apply_settings(&self, settings: &Settings) {
            let volume = settings.effective_volume();
            self.volume.set(volume);
            if let Some(master) = &self.master {
                master.gain().set_value(MASTER_LEVEL * volume);
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            if self.volume.get() <= 0.0 {
                return;
            }
            let (Some(ctx), Some(master)) = (&self.ctx, &self.master) else {
                return;
            };
            self.resume();

            let played = match effect {
                SoundEffect::Shoot => self.play_shoot(ctx, master),
                SoundEffect::Explosion => self.play_explosion(ctx, master),
                SoundEffect::GameOver => self.play_game_over(ctx, master),
            };
            if played.is_none() {
                log::debug!("Could not build {:?} voice", effect);
            }
        }

        // === Sound generators ===

        /// Oscillator routed through its own gain into the master bus
        fn create_osc(
            &self,
            ctx: &AudioContext,
            master: &GainNode,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(master).ok()?;

            Some((osc, gain))
        }

        /// Pew - square wave diving from 800 Hz
        fn play_shoot(&self, ctx: &AudioContext, master: &GainNode) -> Option<()> {
            let (osc, gain) = self.create_osc(ctx, master, 800.0, OscillatorType::Square)?;
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(800.0, t).ok()?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(100.0, t + 0.1)
                .ok()?;
            gain.gain().set_value_at_time(0.5, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + 0.1).ok()
        }

        /// Boom - 0.2 s of low-passed white noise
        fn play_explosion(&self, ctx: &AudioContext, master: &GainNode) -> Option<()> {
            let sample_rate = ctx.sample_rate();
            let len = (sample_rate * 0.2) as u32;
            let buffer = ctx.create_buffer(1, len, sample_rate).ok()?;

            let mut samples: Vec<f32> = {
                let mut rng = self.noise.borrow_mut();
                (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
            };
            buffer.copy_to_channel(&mut samples, 0).ok()?;

            let noise = ctx.create_buffer_source().ok()?;
            noise.set_buffer(Some(&buffer));

            let filter = ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(1000.0);

            let gain = ctx.create_gain().ok()?;
            noise.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(master).ok()?;

            let t = ctx.current_time();
            gain.gain().set_value_at_time(1.0, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok()?;

            noise.start().ok()
        }

        /// Game over - one second sawtooth slide down
        fn play_game_over(&self, ctx: &AudioContext, master: &GainNode) -> Option<()> {
            let (osc, gain) = self.create_osc(ctx, master, 400.0, OscillatorType::Sawtooth)?;
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(400.0, t).ok()?;
            osc.frequency()
                .linear_ramp_to_value_at_time(100.0, t + 1.0)
                .ok()?;
            gain.gain().set_value_at_time(0.5, t).ok()?;
            gain.gain()
                .linear_ramp_to_value_at_time(0.01, t + 1.0)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + 1.0).ok()
        }
    }

    impl AudioSink for WebAudio {
        fn on_shoot(&self) {
            self.play(SoundEffect::Shoot);
        }

        fn on_explosion(&self) {
            self.play(SoundEffect::Explosion);
        }

        fn on_game_over(&self) {
            self.play(SoundEffect::GameOver);
        }
    }
}
