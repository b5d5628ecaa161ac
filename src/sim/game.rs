//! Host-facing facade: input methods, the frame driver and snapshots

use serde::Serialize;

use super::arena::{Arena, GameEvent};
use super::daynight::DayPhase;
use super::enemies::Enemy;
use super::flags::Flag;
use super::geometry::Polygon;
use super::items::Item;
use super::player::{PlayerId, PlayerSnapshot};
use super::rules::{GameMode, MatchOutcome, Standing};
use super::scheduler::{GameState, Scheduler};
use crate::error::ConfigError;
use crate::settings::{Difficulty, GameConfig};

/// A game session: one arena driven by one scheduler
///
/// Time is the host's monotonic clock in milliseconds, sampled by
/// [`Game::frame`]. Input methods act at the most recent sample.
#[derive(Debug, Clone)]
pub struct Game {
    arena: Arena,
    scheduler: Scheduler,
    now: f64,
}

impl Game {
    pub fn new(
        config: GameConfig,
        mode: GameMode,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            arena: Arena::new(config, mode, difficulty, seed),
            scheduler: Scheduler::new(),
            now: 0.0,
        })
    }

    pub fn state(&self) -> GameState {
        self.scheduler.state()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Begin the countdown from the menu
    pub fn start(&mut self, now: f64) -> bool {
        if self.scheduler.state() == GameState::GameOver {
            self.arena.reset();
        }
        self.now = now;
        self.scheduler.start(now)
    }

    /// Discard the round and count down into a fresh one
    pub fn restart(&mut self, now: f64) -> bool {
        self.arena.reset();
        self.scheduler.reset();
        self.now = now;
        self.scheduler.start(now)
    }

    /// Advance to `now`; returns the physics steps run
    ///
    /// Events from the previous frame are dropped first.
    pub fn frame(&mut self, now: f64) -> u32 {
        self.now = now;
        self.arena.clear_events();
        self.scheduler.frame(&mut self.arena, now)
    }

    /// Events recorded during the last frame
    pub fn events(&self) -> &[GameEvent] {
        self.arena.events()
    }

    pub fn set_direction(&mut self, id: PlayerId, dx: i32, dy: i32) -> bool {
        self.arena.set_direction(id, dx, dy, self.now)
    }

    pub fn pause(&mut self) -> bool {
        self.scheduler.pause(&mut self.arena, self.now)
    }

    pub fn resume(&mut self) -> bool {
        self.scheduler.resume(&mut self.arena, self.now)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.arena.set_difficulty(difficulty);
    }

    /// Select a mode; the current round is discarded and lives reset
    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.arena.set_mode(mode);
        self.scheduler.reset();
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.arena.outcome()
    }

    /// Read-only view for renderers and UI
    pub fn snapshot(&self) -> Snapshot {
        let arena = &self.arena;
        let (day_phase, night_opacity) = match arena.day_phase() {
            Some((phase, opacity)) => (Some(phase), opacity),
            None => (None, 0.0),
        };
        Snapshot {
            state: self.scheduler.state(),
            mode: arena.mode(),
            difficulty: arena.difficulty(),
            interpolation: self.scheduler.interpolation(),
            countdown_remaining_ms: self.scheduler.countdown_remaining_ms(),
            game_time_ms: arena.game_time_ms(),
            remaining_time_ms: arena.remaining_time_ms(),
            players: arena
                .players()
                .iter()
                .map(|p| p.snapshot(self.now))
                .collect(),
            territories: arena
                .territory()
                .iter()
                .map(|(player, polygons)| TerritorySnapshot {
                    player,
                    polygons: polygons.to_vec(),
                })
                .collect(),
            standings: arena.standings(),
            flags: arena.flags().flags().to_vec(),
            enemies: arena.enemies().enemies().to_vec(),
            items: arena.items().items().to_vec(),
            day_phase,
            night_opacity,
            outcome: arena.outcome().cloned(),
            events: arena.events().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TerritorySnapshot {
    pub player: PlayerId,
    pub polygons: Vec<Polygon>,
}

/// Everything a renderer or status panel may poll
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: GameState,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Sub-step position in [0, 1) for render smoothing
    pub interpolation: f32,
    pub countdown_remaining_ms: f64,
    pub game_time_ms: f64,
    pub remaining_time_ms: Option<f64>,
    pub players: Vec<PlayerSnapshot>,
    pub territories: Vec<TerritorySnapshot>,
    /// Score, alive state and captured flags per player
    pub standings: Vec<Standing>,
    pub flags: Vec<Flag>,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub day_phase: Option<DayPhase>,
    pub night_opacity: f32,
    pub outcome: Option<MatchOutcome>,
    /// What happened during the last frame
    pub events: Vec<GameEvent>,
}
