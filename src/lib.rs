//! Loop Arena - a two-player territory-claiming arena simulation
//!
//! Core modules:
//! - `sim`: Simulation engine (scheduler, players, territory, collisions, modes)
//! - `settings`: Data-driven round configuration
//! - `error`: Configuration errors
//!
//! Rendering, input capture and UI live outside this crate. They drive a
//! [`sim::Game`] through its input methods and poll read-only snapshots.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{Difficulty, GameConfig};
pub use sim::{Game, GameMode};

/// Simulation constants that are not part of the round configuration
pub mod consts {
    /// Fixed physics rate
    pub const PHYSICS_FPS: u32 = 60;
    /// Fixed physics step in milliseconds
    pub const PHYSICS_DT_MS: f64 = 1000.0 / PHYSICS_FPS as f64;
    /// Maximum physics steps per scheduler frame to bound catch-up work
    pub const MAX_FRAME_SKIP: u32 = 5;
    /// Elapsed real time per frame is clamped to this (stalls are lost time)
    pub const MAX_FRAME_TIME_MS: f64 = 250.0;
    /// Frame duration that player speeds are expressed against
    pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

    /// Countdown before a round starts
    pub const COUNTDOWN_MS: f64 = 3000.0;

    /// Trail must hold this many points before a loop can close
    pub const MIN_ENCLOSURE_POINTS: usize = 20;
    /// Control point extrapolation factor for smoothed trail rendering
    pub const CONTROL_POINT_FACTOR: f32 = 1.5;

    /// Sample stride (pixels) of the territory coverage scan
    pub const SCORE_SAMPLE_STRIDE: usize = 2;
    /// Share of the arena that counts as 100%
    pub const CAPTURABLE_AREA_FRACTION: f32 = 0.95;
    /// Upper bound of a territory score
    pub const MAX_SCORE: f32 = 100.0;

    /// Visual collision flash duration
    pub const COLLISION_FLASH_MS: f64 = 200.0;
}
