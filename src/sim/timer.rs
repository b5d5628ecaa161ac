//! Pausable countdown timer
//!
//! Every timed effect in the simulation (shields, speed boosts, movement
//! locks, return-home countdowns, spawn intervals, item lifetimes) uses this
//! one type. Time is passed in explicitly as a monotonic millisecond sample.

use serde::{Deserialize, Serialize};

/// A countdown that can be frozen while the game is paused
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PausableTimer {
    /// Total duration of the current run
    duration: f64,
    /// Origin of the current run, shifted forward on every resume
    started_at: Option<f64>,
    /// Set while paused
    paused_at: Option<f64>,
}

impl PausableTimer {
    /// An idle timer
    pub const fn new() -> Self {
        Self {
            duration: 0.0,
            started_at: None,
            paused_at: None,
        }
    }

    /// A timer already running
    pub fn started(now: f64, duration: f64) -> Self {
        let mut timer = Self::new();
        timer.start(now, duration);
        timer
    }

    /// (Re)start the countdown. A paused timer stays paused with full duration.
    pub fn start(&mut self, now: f64, duration: f64) {
        self.duration = duration.max(0.0);
        self.started_at = Some(now);
        if self.paused_at.is_some() {
            self.paused_at = Some(now);
        }
    }

    /// Stop and forget the countdown
    pub fn cancel(&mut self) {
        self.started_at = None;
    }

    /// Back to idle, dropping any pause as well
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether the timer was started and not cancelled (it may have expired)
    #[inline]
    pub fn is_set(&self) -> bool {
        self.started_at.is_some()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Elapsed running time, excluding any paused interval
    pub fn elapsed(&self, now: f64) -> f64 {
        match self.started_at {
            Some(start) => {
                let sample = self.paused_at.unwrap_or(now);
                (sample - start).max(0.0)
            }
            None => 0.0,
        }
    }

    /// Remaining time, 0 when idle or expired
    pub fn remaining(&self, now: f64) -> f64 {
        if self.started_at.is_none() {
            return 0.0;
        }
        (self.duration - self.elapsed(now)).max(0.0)
    }

    /// Running and not yet expired
    #[inline]
    pub fn is_active(&self, now: f64) -> bool {
        self.remaining(now) > 0.0
    }

    /// Started and ran out (stays true until restarted or cancelled)
    pub fn has_expired(&self, now: f64) -> bool {
        self.started_at.is_some() && self.elapsed(now) >= self.duration
    }

    /// Freeze the countdown. Pausing twice keeps the first pause instant.
    pub fn pause(&mut self, now: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Continue the countdown, shifting its origin by the paused duration
    pub fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            if let Some(start) = self.started_at.as_mut() {
                *start += (now - paused_at).max(0.0);
            }
        }
    }
}
