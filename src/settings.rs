//! Round configuration
//!
//! Loaded once by the host (JSON or defaults) and treated as immutable for
//! the duration of a round.

use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::GameMode;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Slow,
    #[default]
    Medium,
    Fast,
    Ultra,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Slow,
        Difficulty::Medium,
        Difficulty::Fast,
        Difficulty::Ultra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Slow => "slow",
            Difficulty::Medium => "medium",
            Difficulty::Fast => "fast",
            Difficulty::Ultra => "ultra",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Ok(Difficulty::Slow),
            "medium" | "med" => Ok(Difficulty::Medium),
            "fast" => Ok(Difficulty::Fast),
            "ultra" => Ok(Difficulty::Ultra),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Per-difficulty player tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Base speed in units per nominal frame
    pub speed: f32,
    /// Round duration (ignored by modes without a time limit)
    pub max_time_ms: f64,
    /// Trail point cap
    pub trail_length: usize,
}

/// Difficulty lookup table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTable {
    pub slow: DifficultySettings,
    pub medium: DifficultySettings,
    pub fast: DifficultySettings,
    pub ultra: DifficultySettings,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            slow: DifficultySettings {
                speed: 2.5,
                max_time_ms: 120_000.0,
                trail_length: 400,
            },
            medium: DifficultySettings {
                speed: 3.5,
                max_time_ms: 100_000.0,
                trail_length: 350,
            },
            fast: DifficultySettings {
                speed: 4.0,
                max_time_ms: 80_000.0,
                trail_length: 300,
            },
            ultra: DifficultySettings {
                speed: 6.0,
                max_time_ms: 80_000.0,
                trail_length: 250,
            },
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, difficulty: Difficulty) -> &DifficultySettings {
        match difficulty {
            Difficulty::Slow => &self.slow,
            Difficulty::Medium => &self.medium,
            Difficulty::Fast => &self.fast,
            Difficulty::Ultra => &self.ultra,
        }
    }
}

/// Starting lives per game mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeLives {
    pub explore: u32,
    pub fight: u32,
    pub infinite: u32,
    pub survival: u32,
    pub capture: u32,
    pub daynight: u32,
}

impl Default for ModeLives {
    fn default() -> Self {
        Self {
            explore: 1,
            fight: 3,
            infinite: 2,
            survival: 3,
            capture: 1,
            daynight: 3,
        }
    }
}

impl ModeLives {
    pub fn get(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Explore => self.explore,
            GameMode::Fight => self.fight,
            GameMode::Infinite => self.infinite,
            GameMode::Survival => self.survival,
            GameMode::Capture => self.capture,
            GameMode::DayNight => self.daynight,
        }
    }
}

/// Arena geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
    /// Spawn points as fractions of the arena size, one per player
    pub spawn_points: [(f32, f32); 2],
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            spawn_points: [(0.15, 0.5), (0.85, 0.5)],
        }
    }
}

impl ArenaSettings {
    /// Spawn point of the player at `index` in arena units
    pub fn spawn_point(&self, index: usize) -> Vec2 {
        let (fx, fy) = self.spawn_points[index % self.spawn_points.len()];
        Vec2::new(fx * self.width, fy * self.height)
    }
}

/// Player defaults shared by every mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDefaults {
    /// Collision radius
    pub size: f32,
    /// Distance between resampled trail points
    pub trail_spacing: f32,
    /// Return-to-base radius for closing a loop
    pub home_radius: f32,
    /// Infinite mode lockout after the first death
    pub lock_ms: f64,
    /// Lockout growth per further death
    pub lock_increment_ms: f64,
    /// Capture mode: time allowed away from home
    pub home_time_limit_ms: f64,
    /// Survival mode: shield granted after a death
    pub death_shield_ms: f64,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            size: 8.0,
            trail_spacing: 2.0,
            home_radius: 20.0,
            lock_ms: 5000.0,
            lock_increment_ms: 2000.0,
            home_time_limit_ms: 15_000.0,
            death_shield_ms: 3000.0,
        }
    }
}

/// Survival enemy tuning for one difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    pub speed_multiplier: f32,
    pub initial_count: usize,
    pub max_enemies: usize,
    pub spawn_interval_ms: f64,
}

/// Survival enemy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySettings {
    pub base_speed: f32,
    pub size: f32,
    pub detection_radius: f32,
    /// Extra contact distance added to the enemy size
    pub contact_margin: f32,
    /// Time an enemy ignores players after a hit
    pub relax_ms: f64,
    pub slow: EnemyWave,
    pub medium: EnemyWave,
    pub fast: EnemyWave,
    pub ultra: EnemyWave,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            base_speed: 1.5,
            size: 8.0,
            detection_radius: 150.0,
            contact_margin: 5.0,
            relax_ms: 5000.0,
            slow: EnemyWave {
                speed_multiplier: 0.9,
                initial_count: 2,
                max_enemies: 6,
                spawn_interval_ms: 30_000.0,
            },
            medium: EnemyWave {
                speed_multiplier: 1.2,
                initial_count: 3,
                max_enemies: 7,
                spawn_interval_ms: 20_000.0,
            },
            fast: EnemyWave {
                speed_multiplier: 1.4,
                initial_count: 4,
                max_enemies: 8,
                spawn_interval_ms: 15_000.0,
            },
            ultra: EnemyWave {
                speed_multiplier: 2.0,
                initial_count: 5,
                max_enemies: 10,
                spawn_interval_ms: 10_000.0,
            },
        }
    }
}

impl EnemySettings {
    pub fn wave(&self, difficulty: Difficulty) -> &EnemyWave {
        match difficulty {
            Difficulty::Slow => &self.slow,
            Difficulty::Medium => &self.medium,
            Difficulty::Fast => &self.fast,
            Difficulty::Ultra => &self.ultra,
        }
    }
}

/// Capture mode flag placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagSettings {
    pub count: usize,
    pub size: f32,
    pub min_distance_from_spawn: f32,
    pub min_distance_between: f32,
}

impl Default for FlagSettings {
    fn default() -> Self {
        Self {
            count: 5,
            size: 25.0,
            min_distance_from_spawn: 300.0,
            min_distance_between: 100.0,
        }
    }
}

/// Power-up items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSettings {
    pub spawn_interval_ms: f64,
    pub lifetime_ms: f64,
    pub radius: f32,
    pub speed_multiplier: f32,
    pub speed_duration_ms: f64,
    pub length_bonus: usize,
    pub shield_duration_ms: f64,
    /// Weights for speed, length and shield
    pub weights: [u32; 3],
}

impl Default for ItemSettings {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000.0,
            lifetime_ms: 10_000.0,
            radius: 15.0,
            speed_multiplier: 1.5,
            speed_duration_ms: 5000.0,
            length_bonus: 100,
            shield_duration_ms: 10_000.0,
            weights: [40, 30, 30],
        }
    }
}

/// Complete round configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaSettings,
    pub difficulties: DifficultyTable,
    pub lives: ModeLives,
    pub player: PlayerDefaults,
    pub enemies: EnemySettings,
    pub flags: FlagSettings,
    pub items: ItemSettings,
}

impl GameConfig {
    /// Parse and validate a JSON config; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(ConfigError::invalid(
                "arena",
                format!("size must be positive, got {}x{}", self.arena.width, self.arena.height),
            ));
        }
        for (fx, fy) in self.arena.spawn_points {
            if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
                return Err(ConfigError::invalid(
                    "arena.spawn_points",
                    format!("({fx}, {fy}) lies outside the arena"),
                ));
            }
        }
        for difficulty in Difficulty::ALL {
            let settings = self.difficulties.get(difficulty);
            if settings.speed <= 0.0 {
                return Err(ConfigError::invalid(
                    "difficulties.speed",
                    format!("{} speed must be positive", difficulty.as_str()),
                ));
            }
            if settings.trail_length == 0 {
                return Err(ConfigError::invalid(
                    "difficulties.trail_length",
                    format!("{} trail length must be at least 1", difficulty.as_str()),
                ));
            }
            if settings.max_time_ms <= 0.0 {
                return Err(ConfigError::invalid(
                    "difficulties.max_time_ms",
                    format!("{} round time must be positive", difficulty.as_str()),
                ));
            }
        }
        for mode in GameMode::ALL {
            if self.lives.get(mode) == 0 {
                return Err(ConfigError::invalid(
                    "lives",
                    format!("{} must start with at least one life", mode.as_str()),
                ));
            }
        }
        if self.player.size <= 0.0 {
            return Err(ConfigError::invalid("player.size", "must be positive"));
        }
        if self.player.trail_spacing <= 0.0 {
            return Err(ConfigError::invalid("player.trail_spacing", "must be positive"));
        }
        if self.items.weights.iter().all(|w| *w == 0) {
            return Err(ConfigError::invalid("items.weights", "at least one weight must be non-zero"));
        }
        Ok(())
    }
}
