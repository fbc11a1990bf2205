//! Variable timestep frame clock
//!
//! The browser hands us one monotonic timestamp (ms) per display refresh.
//! [`FrameClock`] turns that stream into a bounded delta time, and
//! [`FrameLoop`] makes sure only one self-rescheduling animation-frame chain
//! is ever alive.

use crate::sanitize_dt;

/// Converts timestamps (ms) into clamped frame deltas (s)
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Restart measuring from `now_ms`
    pub fn reset(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }

    /// Delta since the previous timestamp, clamped to `[0, max_dt]`
    ///
    /// The first call after construction only primes the clock and returns 0.
    /// Timestamps that go backwards yield 0 (no motion) and re-anchor.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0.0;
        };
        let raw = ((now_ms - last) / 1000.0) as f32;
        if raw < 0.0 {
            log::debug!("Clock went backwards by {:.1} ms", last - now_ms);
        }
        sanitize_dt(raw, self.max_dt)
    }

}

/// Identity of one animation-frame chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTicket(u64);

/// Guard against duplicate frame loops
///
/// Every `restart` retires the previous chain: its ticket stops being current
/// and its pending frame request (if recorded) is handed back for
/// cancellation.
#[derive(Debug, Default)]
pub struct FrameLoop {
    generation: u64,
    pending: Option<i32>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire the running chain and issue a ticket for a new one
    ///
    /// Returns the new ticket and the outstanding request id of the retired
    /// chain, which the caller should cancel.
    pub fn restart(&mut self) -> (LoopTicket, Option<i32>) {
        self.generation += 1;
        (LoopTicket(self.generation), self.pending.take())
    }

    /// Whether a callback holding `ticket` may keep running
    pub fn is_current(&self, ticket: LoopTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Record the next frame request made by the chain holding `ticket`
    ///
    /// Returns false (and records nothing) if the ticket is stale.
    pub fn record_request(&mut self, ticket: LoopTicket, request_id: i32) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = Some(request_id);
        true
    }

    /// Called when a frame callback starts running: its request is spent
    pub fn frame_started(&mut self, ticket: LoopTicket) {
        if self.is_current(ticket) {
            self.pending = None;
        }
    }
}
