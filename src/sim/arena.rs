//! The arena: all round state and the fixed physics step
//!
//! Step order:
//! 1. Advance game time, end the round at the time limit
//! 2. Mode extras (enemies, flag release, return-home countdown)
//! 3. Items spawn/expire, pickups
//! 4. Player motion and trail growth
//! 5. Player-vs-player collisions, unless the mode opts out
//! 6. Enclosures, flag capture, scores
//! 7. Win checks (territory threshold, last player standing)
//!
//! Collisions, pickups and enclosures are recorded as [`GameEvent`]s until
//! the host clears them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Collision};
use super::daynight::{self, DayPhase};
use super::enemies::EnemySwarm;
use super::flags::FlagField;
use super::items::{ItemField, Pickup};
use super::player::{Player, PlayerId};
use super::rules::{DeathConsequence, GameMode, MatchOutcome, ModeRules, Standing, evaluate_winner};
use super::scheduler::{Simulation, StepOutcome};
use super::territory::TerritoryStore;
use crate::settings::{Difficulty, GameConfig};

/// Number of players in a round
pub const PLAYER_COUNT: usize = 2;

/// Something that happened during a physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Collision(Collision),
    Pickup(Pickup),
    /// A loop was closed into territory
    Enclosure {
        player: PlayerId,
        flags_captured: usize,
    },
}

/// Complete simulation state of one round
#[derive(Debug, Clone)]
pub struct Arena {
    config: GameConfig,
    mode: GameMode,
    difficulty: Difficulty,
    rules: ModeRules,
    /// Sorted by ascending id
    players: Vec<Player>,
    territory: TerritoryStore,
    flags: FlagField,
    enemies: EnemySwarm,
    items: ItemField,
    rng: Pcg32,
    game_time_ms: f64,
    max_time_ms: f64,
    outcome: Option<MatchOutcome>,
    events: Vec<GameEvent>,
}

impl Arena {
    /// Build a fresh round. `config` is expected to be validated.
    pub fn new(config: GameConfig, mode: GameMode, difficulty: Difficulty, seed: u64) -> Self {
        let players = (0..PLAYER_COUNT)
            .map(|index| {
                let heading = if index == 0 { Vec2::X } else { Vec2::NEG_X };
                Player::new(
                    index as PlayerId + 1,
                    config.arena.spawn_point(index),
                    heading,
                    &config.player,
                )
            })
            .collect();
        let mut arena = Self {
            territory: TerritoryStore::new(config.arena.width, config.arena.height),
            rules: ModeRules::for_mode(mode, &config),
            enemies: EnemySwarm::new(*config.enemies.wave(difficulty)),
            max_time_ms: config.difficulties.get(difficulty).max_time_ms,
            config,
            mode,
            difficulty,
            players,
            flags: FlagField::default(),
            items: ItemField::default(),
            rng: Pcg32::seed_from_u64(seed),
            game_time_ms: 0.0,
            outcome: None,
            events: Vec::new(),
        };
        arena.reset();
        arena
    }

    /// Full reset of players, territory and mode state
    pub fn reset(&mut self) {
        let settings = *self.config.difficulties.get(self.difficulty);
        for player in &mut self.players {
            player.apply_difficulty(&settings);
            player.reset(self.rules.starting_lives);
        }
        self.territory.clear();
        self.items.clear();
        self.enemies.clear();
        self.flags = if self.rules.flags {
            FlagField::place(&self.config.flags, &self.config.arena, &mut self.rng)
        } else {
            FlagField::default()
        };
        self.game_time_ms = 0.0;
        self.max_time_ms = settings.max_time_ms;
        self.outcome = None;
        self.events.clear();
    }

    /// Switch mode; lives and round state reset
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.rules = ModeRules::for_mode(mode, &self.config);
        log::info!("game mode set to {}", mode.as_str());
        self.reset();
    }

    /// Switch difficulty; speed, trail cap, round time and enemy waves follow
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        let settings = *self.config.difficulties.get(difficulty);
        for player in &mut self.players {
            player.apply_difficulty(&settings);
        }
        self.max_time_ms = settings.max_time_ms;
        self.enemies
            .set_wave(*self.config.enemies.wave(difficulty), &self.config.enemies);
        log::info!("difficulty set to {}", difficulty.as_str());
    }

    /// Steer a player; unknown ids are ignored
    pub fn set_direction(&mut self, id: PlayerId, dx: i32, dy: i32, now: f64) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.set_direction(dx, dy, now);
                true
            }
            None => false,
        }
    }

    fn arena_size(&self) -> Vec2 {
        Vec2::new(self.config.arena.width, self.config.arena.height)
    }

    /// Capture mode: players away from home too long lose a life
    fn enforce_return_home(&mut self, now: f64) {
        let radius = self.config.player.home_radius;
        let limit = self.config.player.home_time_limit_ms;
        for player in &mut self.players {
            if !player.alive || player.is_locked(now) {
                continue;
            }
            if player.track_home(now, radius, limit) {
                log::debug!("player {} did not return home in time", player.id);
                player.die(DeathConsequence::LoseLifeAndRespawn, now);
            }
        }
    }

    fn refresh_scores(&mut self) {
        for player in &mut self.players {
            player.score = self.territory.score(player.id);
        }
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.players
            .iter()
            .map(|p| Standing {
                id: p.id,
                alive: p.alive,
                score: p.score,
                flags: self.flags.count_for(p.id),
            })
            .collect()
    }

    fn finish(&mut self, reason: &str) -> StepOutcome {
        self.refresh_scores();
        let outcome = evaluate_winner(self.mode, &self.standings());
        log::info!("round over ({reason}): {outcome:?}");
        self.outcome = Some(outcome);
        StepOutcome::GameOver
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rules(&self) -> &ModeRules {
        &self.rules
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[cfg(test)]
    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn territory(&self) -> &TerritoryStore {
        &self.territory
    }

    pub fn flags(&self) -> &FlagField {
        &self.flags
    }

    pub fn enemies(&self) -> &EnemySwarm {
        &self.enemies
    }

    pub fn items(&self) -> &ItemField {
        &self.items
    }

    pub fn game_time_ms(&self) -> f64 {
        self.game_time_ms
    }

    /// Time left in the round, `None` for modes without a limit
    pub fn remaining_time_ms(&self) -> Option<f64> {
        self.rules
            .time_limited
            .then(|| (self.max_time_ms - self.game_time_ms).max(0.0))
    }

    pub fn day_phase(&self) -> Option<(DayPhase, f32)> {
        self.rules.day_night.then(|| {
            (
                daynight::phase_at(self.game_time_ms),
                daynight::night_opacity(self.game_time_ms),
            )
        })
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Events recorded since the last [`Arena::clear_events`]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl Simulation for Arena {
    fn begin_round(&mut self, now: f64) {
        self.items.begin(now, &self.config.items);
        if self.rules.enemies {
            let size = self.arena_size();
            self.enemies
                .begin(now, &self.config.enemies, size, &mut self.rng);
        }
        log::info!(
            "{} round on {} begins",
            self.mode.as_str(),
            self.difficulty.as_str()
        );
    }

    fn fixed_update(&mut self, dt_ms: f64, now: f64) -> StepOutcome {
        if self.outcome.is_some() {
            return StepOutcome::GameOver;
        }
        let size = self.arena_size();

        self.game_time_ms += dt_ms;
        if self.rules.time_limited && self.game_time_ms >= self.max_time_ms {
            return self.finish("time limit");
        }

        if self.rules.enemies {
            let contacts = self.enemies.update(
                dt_ms,
                now,
                &mut self.players,
                &self.rules,
                &self.config.enemies,
                size,
                &mut self.rng,
            );
            self.events
                .extend(contacts.into_iter().map(GameEvent::Collision));
        }
        if self.rules.flags {
            self.flags.release_dead(&self.players);
            self.enforce_return_home(now);
        }

        self.items.update(
            now,
            &self.config.items,
            &self.config.arena,
            &self.flags,
            &mut self.rng,
        );
        let pickups = self
            .items
            .collect(&mut self.players, &self.config.items, now);
        self.events.extend(pickups.into_iter().map(GameEvent::Pickup));

        for player in &mut self.players {
            player.update(dt_ms, now, size);
        }

        if self.rules.player_collisions {
            let collisions =
                collision::resolve(&mut self.players, &self.territory, &self.rules, now);
            self.events
                .extend(collisions.into_iter().map(GameEvent::Collision));
        }

        let home_radius = self.config.player.home_radius;
        for player in &mut self.players {
            if let Some(polygon) = self.territory.detect_enclosure(player, home_radius) {
                let flags_captured = if self.rules.flags {
                    self.flags.capture_in(&polygon, player.id)
                } else {
                    0
                };
                self.events.push(GameEvent::Enclosure {
                    player: player.id,
                    flags_captured,
                });
            }
        }
        self.refresh_scores();

        if let Some(threshold) = self.rules.territory_win_threshold
            && self.players.iter().any(|p| p.score >= threshold)
        {
            return self.finish("territory threshold");
        }
        if self.players.iter().filter(|p| p.alive).count() <= 1 {
            return self.finish("last player standing");
        }
        StepOutcome::Continue
    }

    fn pause(&mut self, now: f64) {
        for player in &mut self.players {
            player.effects.pause(now);
        }
        self.items.pause(now);
        self.enemies.pause(now);
    }

    fn resume(&mut self, now: f64) {
        for player in &mut self.players {
            player.effects.resume(now);
        }
        self.items.resume(now);
        self.enemies.resume(now);
    }
}
