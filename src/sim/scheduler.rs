//! Fixed-timestep scheduler and round state machine
//!
//! The host calls [`Scheduler::frame`] once per display refresh with a
//! monotonic millisecond clock. Physics runs in constant `PHYSICS_DT_MS`
//! steps, at most `MAX_FRAME_SKIP` per frame.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Menu,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

/// Whether the round continues after a physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    GameOver,
}

/// What the scheduler drives
pub trait Simulation {
    /// Playing begins (countdown finished)
    fn begin_round(&mut self, now: f64);
    /// Advance one fixed step of `dt_ms`
    fn fixed_update(&mut self, dt_ms: f64, now: f64) -> StepOutcome;
    fn pause(&mut self, now: f64);
    fn resume(&mut self, now: f64);
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    state: GameState,
    last_time: Option<f64>,
    accumulator: f64,
    countdown_ms: f64,
    steps_last_frame: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            state: GameState::Menu,
            last_time: None,
            accumulator: 0.0,
            countdown_ms: 0.0,
            steps_last_frame: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Fraction of a physics step left in the accumulator, in [0, 1)
    pub fn interpolation(&self) -> f32 {
        (self.accumulator / PHYSICS_DT_MS) as f32
    }

    pub fn countdown_remaining_ms(&self) -> f64 {
        self.countdown_ms
    }

    pub fn steps_last_frame(&self) -> u32 {
        self.steps_last_frame
    }

    /// Back to the menu, dropping all timing state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Enter the countdown. Only valid from the menu or after a game over.
    pub fn start(&mut self, now: f64) -> bool {
        match self.state {
            GameState::Menu | GameState::GameOver => {
                self.state = GameState::Countdown;
                self.countdown_ms = COUNTDOWN_MS;
                self.accumulator = 0.0;
                self.last_time = Some(now);
                true
            }
            GameState::Countdown | GameState::Playing | GameState::Paused => false,
        }
    }

    pub fn pause<S: Simulation>(&mut self, sim: &mut S, now: f64) -> bool {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                sim.pause(now);
                true
            }
            _ => false,
        }
    }

    pub fn resume<S: Simulation>(&mut self, sim: &mut S, now: f64) -> bool {
        match self.state {
            GameState::Paused => {
                self.state = GameState::Playing;
                // The paused interval never reaches the accumulator
                self.last_time = Some(now);
                sim.resume(now);
                true
            }
            _ => false,
        }
    }

    /// Run one display frame; returns the number of physics steps taken
    pub fn frame<S: Simulation>(&mut self, sim: &mut S, now: f64) -> u32 {
        let elapsed = match self.last_time {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_TIME_MS),
            None => 0.0,
        };
        self.last_time = Some(now);
        self.steps_last_frame = 0;

        match self.state {
            GameState::Countdown => {
                self.countdown_ms -= elapsed;
                if self.countdown_ms <= 0.0 {
                    self.countdown_ms = 0.0;
                    self.state = GameState::Playing;
                    self.accumulator = 0.0;
                    sim.begin_round(now);
                    log::info!("round started");
                }
            }
            GameState::Playing => {
                self.accumulator += elapsed;
                while self.accumulator >= PHYSICS_DT_MS && self.steps_last_frame < MAX_FRAME_SKIP {
                    self.accumulator -= PHYSICS_DT_MS;
                    self.steps_last_frame += 1;
                    if sim.fixed_update(PHYSICS_DT_MS, now) == StepOutcome::GameOver {
                        self.state = GameState::GameOver;
                        self.accumulator = 0.0;
                        break;
                    }
                }
                // Whole steps beyond the frame-skip budget are lost time
                if self.accumulator >= PHYSICS_DT_MS {
                    self.accumulator %= PHYSICS_DT_MS;
                }
            }
            GameState::Menu | GameState::Paused | GameState::GameOver => {}
        }
        self.steps_last_frame
    }
}
