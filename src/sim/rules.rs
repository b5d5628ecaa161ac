//! Game modes and the per-mode rule set

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::player::{DeathResult, Player, PlayerId};
use crate::error::ConfigError;
use crate::settings::GameConfig;

/// Available game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Explore,
    Fight,
    Infinite,
    Survival,
    Capture,
    DayNight,
}

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Explore,
        GameMode::Fight,
        GameMode::Infinite,
        GameMode::Survival,
        GameMode::Capture,
        GameMode::DayNight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Explore => "explore",
            GameMode::Fight => "fight",
            GameMode::Infinite => "infinite",
            GameMode::Survival => "survival",
            GameMode::Capture => "capture",
            GameMode::DayNight => "daynight",
        }
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explore" => Ok(GameMode::Explore),
            "fight" => Ok(GameMode::Fight),
            "infinite" => Ok(GameMode::Infinite),
            "survival" => Ok(GameMode::Survival),
            "capture" => Ok(GameMode::Capture),
            "daynight" | "day-night" => Ok(GameMode::DayNight),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Who dies when a head touches another player's trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailRule {
    /// The player that ran into the trail
    CrasherDies,
    /// The player whose trail was cut
    OwnerDies,
}

/// What a death costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathConsequence {
    /// Out of the round immediately
    Eliminate,
    /// Lose a life, respawn while lives remain
    LoseLifeAndRespawn,
    /// Lose a life; survivors get their lives refilled and a growing movement lock
    RespawnWithLockout { refill_lives: u32 },
}

/// Policy for one game mode
///
/// Where players collide, a head-on collision kills both. The rest varies:
///
/// | mode     | trail hit   | on death                 | extras                     |
/// |----------|-------------|--------------------------|----------------------------|
/// | explore  | crasher     | eliminate                |                            |
/// | capture  | crasher     | eliminate                | flags, return home         |
/// | fight    | trail owner | lose life, respawn       |                            |
/// | daynight | trail owner | lose life, respawn       | day/night phase            |
/// | survival | none        | lose life, respawn       | enemies, shield            |
/// | infinite | trail owner | respawn with lockout     | shield after lock, 60% wins |
///
/// Survival players pass through each other; only enemies kill there.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeRules {
    pub mode: GameMode,
    pub starting_lives: u32,
    pub trail_rule: TrailRule,
    pub death: DeathConsequence,
    /// Head, trail and territory contacts between players are resolved
    pub player_collisions: bool,
    /// Score that ends the round on the tick it is reached
    pub territory_win_threshold: Option<f32>,
    /// Round ends when the difficulty's time runs out
    pub time_limited: bool,
    /// Shield granted to a respawned player, counted from the end of any lockout
    pub death_shield_ms: Option<f64>,
    pub enemies: bool,
    pub flags: bool,
    pub day_night: bool,
}

impl ModeRules {
    pub fn for_mode(mode: GameMode, config: &GameConfig) -> Self {
        let starting_lives = config.lives.get(mode);
        let base = Self {
            mode,
            starting_lives,
            trail_rule: TrailRule::OwnerDies,
            death: DeathConsequence::LoseLifeAndRespawn,
            player_collisions: true,
            territory_win_threshold: None,
            time_limited: true,
            death_shield_ms: None,
            enemies: false,
            flags: false,
            day_night: false,
        };
        match mode {
            GameMode::Explore => Self {
                trail_rule: TrailRule::CrasherDies,
                death: DeathConsequence::Eliminate,
                ..base
            },
            GameMode::Capture => Self {
                trail_rule: TrailRule::CrasherDies,
                death: DeathConsequence::Eliminate,
                flags: true,
                ..base
            },
            GameMode::Fight => base,
            GameMode::DayNight => Self {
                day_night: true,
                ..base
            },
            GameMode::Survival => Self {
                player_collisions: false,
                death_shield_ms: Some(config.player.death_shield_ms),
                enemies: true,
                ..base
            },
            GameMode::Infinite => Self {
                death: DeathConsequence::RespawnWithLockout {
                    refill_lives: starting_lives,
                },
                territory_win_threshold: Some(60.0),
                time_limited: false,
                death_shield_ms: Some(config.player.death_shield_ms),
                ..base
            },
        }
    }

    /// The single death path used by every collision source
    pub fn kill(&self, player: &mut Player, now: f64) -> DeathResult {
        let result = player.die(self.death, now);
        if result == DeathResult::Respawned
            && let Some(shield_ms) = self.death_shield_ms
        {
            let lock_ms = player.effects.lock.remaining(now);
            player.activate_shield(lock_ms + shield_ms, now);
        }
        result
    }
}

/// End-of-round standing of one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub id: PlayerId,
    pub alive: bool,
    pub score: f32,
    pub flags: usize,
}

/// Round result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "players", rename_all = "lowercase")]
pub enum MatchOutcome {
    Winner(PlayerId),
    Draw(Vec<PlayerId>),
}

/// Pick the winner: living players first, then flags (capture), then territory
pub fn evaluate_winner(mode: GameMode, standings: &[Standing]) -> MatchOutcome {
    let mut candidates: Vec<&Standing> = standings.iter().filter(|s| s.alive).collect();
    if candidates.is_empty() {
        candidates = standings.iter().collect();
    }

    if mode == GameMode::Capture && candidates.len() > 1 {
        let most_flags = candidates.iter().map(|s| s.flags).max().unwrap_or(0);
        candidates.retain(|s| s.flags == most_flags);
    }
    if candidates.len() > 1 {
        let best = candidates
            .iter()
            .map(|s| s.score)
            .fold(f32::NEG_INFINITY, f32::max);
        candidates.retain(|s| s.score == best);
    }

    match candidates.as_slice() {
        [only] => MatchOutcome::Winner(only.id),
        tied => MatchOutcome::Draw(tied.iter().map(|s| s.id).collect()),
    }
}
