//! Survival mode AI enemies
//!
//! Enemies wander until a living player comes within detection range, then
//! chase it, speeding up as they close in. Touching a player kills it unless
//! shielded, after which the enemy relaxes and ignores players for a while.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Collision, CollisionKind};
use super::player::Player;
use super::rules::ModeRules;
use super::timer::PausableTimer;
use crate::settings::{EnemySettings, EnemyWave};

/// Frame duration enemy speeds are expressed against
const ENEMY_NOMINAL_FRAME_MS: f64 = 20.0;
/// Wander heading changes this often
const WANDER_TURN_MS: f64 = 1000.0;
const WANDER_SPEED_FACTOR: f32 = 0.5;
const MAX_CHASE_MULTIPLIER: f32 = 2.0;
/// Enemies this far outside the arena are dropped
const CLEANUP_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyState {
    Wander,
    Chase,
    Relax,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    /// Heading in radians
    pub angle: f32,
    pub speed: f32,
    pub size: f32,
    pub state: EnemyState,
    wander_timer: PausableTimer,
    relax_timer: PausableTimer,
}

impl Enemy {
    fn new(pos: Vec2, angle: f32, speed: f32, size: f32) -> Self {
        Self {
            pos,
            angle,
            speed,
            size,
            state: EnemyState::Wander,
            wander_timer: PausableTimer::new(),
            relax_timer: PausableTimer::new(),
        }
    }

    #[inline]
    pub fn is_relaxed(&self, now: f64) -> bool {
        self.relax_timer.is_active(now)
    }

    fn update(
        &mut self,
        dt_ms: f64,
        now: f64,
        players: &[Player],
        settings: &EnemySettings,
        arena_size: Vec2,
        rng: &mut impl Rng,
    ) {
        let frames = (dt_ms / ENEMY_NOMINAL_FRAME_MS) as f32;
        let target = players
            .iter()
            .filter(|p| p.alive)
            .map(|p| (p.pos, self.pos.distance(p.pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match target {
            Some((target_pos, distance))
                if !self.is_relaxed(now) && distance < settings.detection_radius =>
            {
                self.state = EnemyState::Chase;
                if distance > 0.0 {
                    let boost = (settings.detection_radius / distance).clamp(1.0, MAX_CHASE_MULTIPLIER);
                    self.pos += (target_pos - self.pos) / distance * self.speed * boost * frames;
                }
            }
            _ => {
                self.state = if self.is_relaxed(now) {
                    EnemyState::Relax
                } else {
                    EnemyState::Wander
                };
                if !self.wander_timer.is_active(now) {
                    self.angle += rng.random_range(-0.5..0.5) * FRAC_PI_2;
                    self.wander_timer.start(now, WANDER_TURN_MS);
                }
                self.pos += Vec2::from_angle(self.angle) * self.speed * WANDER_SPEED_FACTOR * frames;
            }
        }

        self.bounce(arena_size);
    }

    /// Clamp to the arena and mirror the heading off the wall that was hit
    fn bounce(&mut self, arena_size: Vec2) {
        let margin = self.size;
        if self.pos.x < margin {
            self.pos.x = margin;
            self.angle = std::f32::consts::PI - self.angle;
        } else if self.pos.x > arena_size.x - margin {
            self.pos.x = arena_size.x - margin;
            self.angle = std::f32::consts::PI - self.angle;
        }
        if self.pos.y < margin {
            self.pos.y = margin;
            self.angle = -self.angle;
        } else if self.pos.y > arena_size.y - margin {
            self.pos.y = arena_size.y - margin;
            self.angle = -self.angle;
        }
    }
}

/// The enemy population of a survival round
#[derive(Debug, Clone)]
pub struct EnemySwarm {
    enemies: Vec<Enemy>,
    wave: EnemyWave,
    spawn_timer: PausableTimer,
}

impl EnemySwarm {
    pub fn new(wave: EnemyWave) -> Self {
        Self {
            enemies: Vec::new(),
            wave,
            spawn_timer: PausableTimer::new(),
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
        self.spawn_timer.reset();
    }

    /// Change difficulty; live enemies pick up the new speed
    pub fn set_wave(&mut self, wave: EnemyWave, settings: &EnemySettings) {
        self.wave = wave;
        let speed = settings.base_speed * wave.speed_multiplier;
        for enemy in &mut self.enemies {
            enemy.speed = speed;
        }
    }

    /// Spawn the opening wave and arm the spawn clock
    pub fn begin(&mut self, now: f64, settings: &EnemySettings, arena_size: Vec2, rng: &mut impl Rng) {
        self.enemies.clear();
        for _ in 0..self.wave.initial_count {
            self.spawn(settings, arena_size, rng);
        }
        self.spawn_timer.start(now, self.wave.spawn_interval_ms);
    }

    /// Spawn on a random arena edge, up to the cap
    fn spawn(&mut self, settings: &EnemySettings, arena_size: Vec2, rng: &mut impl Rng) {
        if self.enemies.len() >= self.wave.max_enemies {
            return;
        }
        let along_x = rng.random_range(0.0..=arena_size.x);
        let along_y = rng.random_range(0.0..=arena_size.y);
        let pos = match rng.random_range(0..4) {
            0 => Vec2::new(along_x, 0.0),
            1 => Vec2::new(arena_size.x, along_y),
            2 => Vec2::new(along_x, arena_size.y),
            _ => Vec2::new(0.0, along_y),
        };
        let angle = rng.random_range(0.0..TAU);
        let speed = settings.base_speed * self.wave.speed_multiplier;
        self.enemies.push(Enemy::new(pos, angle, speed, settings.size));
    }

    /// Move enemies, spawn on schedule and resolve contacts with players
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt_ms: f64,
        now: f64,
        players: &mut [Player],
        rules: &ModeRules,
        settings: &EnemySettings,
        arena_size: Vec2,
        rng: &mut impl Rng,
    ) -> Vec<Collision> {
        if self.spawn_timer.has_expired(now) {
            self.spawn(settings, arena_size, rng);
            self.spawn_timer.start(now, self.wave.spawn_interval_ms);
        }

        for enemy in &mut self.enemies {
            enemy.update(dt_ms, now, players, settings, arena_size, rng);
        }

        let mut collisions = Vec::new();
        for enemy in &mut self.enemies {
            for player in players.iter_mut() {
                if !player.alive || enemy.pos.distance(player.pos) >= enemy.size + settings.contact_margin {
                    continue;
                }
                enemy.relax_timer.start(now, settings.relax_ms);
                enemy.state = EnemyState::Relax;
                if player.has_shield(now) {
                    continue;
                }
                rules.kill(player, now);
                log::debug!("player {} caught by an enemy", player.id);
                collisions.push(Collision {
                    kind: CollisionKind::Enemy,
                    player: player.id,
                    opponent: None,
                });
            }
        }

        self.enemies.retain(|e| {
            e.pos.x > -CLEANUP_MARGIN
                && e.pos.x < arena_size.x + CLEANUP_MARGIN
                && e.pos.y > -CLEANUP_MARGIN
                && e.pos.y < arena_size.y + CLEANUP_MARGIN
        });

        collisions
    }

    pub fn pause(&mut self, now: f64) {
        self.spawn_timer.pause(now);
        for enemy in &mut self.enemies {
            enemy.wander_timer.pause(now);
            enemy.relax_timer.pause(now);
        }
    }

    pub fn resume(&mut self, now: f64) {
        self.spawn_timer.resume(now);
        for enemy in &mut self.enemies {
            enemy.wander_timer.resume(now);
            enemy.relax_timer.resume(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, GameConfig};
    use crate::sim::rules::GameMode;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const ARENA: Vec2 = Vec2::new(1200.0, 600.0);

    fn swarm_with(enemies: Vec<Enemy>) -> EnemySwarm {
        let config = GameConfig::default();
        let mut swarm = EnemySwarm::new(*config.enemies.wave(Difficulty::Medium));
        swarm.enemies = enemies;
        swarm
    }

    fn survivor(id: u8, pos: Vec2) -> Player {
        let config = GameConfig::default();
        let mut player = Player::new(id, pos, Vec2::X, &config.player);
        player.lives = 3;
        player
    }

    #[test]
    fn test_opening_wave_on_edges() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut swarm = EnemySwarm::new(*config.enemies.wave(Difficulty::Fast));
        swarm.begin(0.0, &config.enemies, ARENA, &mut rng);
        assert_eq!(swarm.len(), 4);
        for enemy in swarm.enemies() {
            let on_edge = enemy.pos.x == 0.0
                || enemy.pos.y == 0.0
                || enemy.pos.x == ARENA.x
                || enemy.pos.y == ARENA.y;
            assert!(on_edge, "{:?}", enemy.pos);
        }
    }

    #[test]
    fn test_spawn_respects_cap() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let wave = *config.enemies.wave(Difficulty::Slow);
        let mut swarm = EnemySwarm::new(wave);
        for _ in 0..20 {
            swarm.spawn(&config.enemies, ARENA, &mut rng);
        }
        assert_eq!(swarm.len(), wave.max_enemies);
    }

    #[test]
    fn test_chases_nearby_player() {
        let config = GameConfig::default();
        let rules = ModeRules::for_mode(GameMode::Survival, &config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut swarm = swarm_with(vec![Enemy::new(Vec2::new(500.0, 300.0), 0.0, 1.5, 8.0)]);
        let mut players = vec![survivor(1, Vec2::new(600.0, 300.0))];

        swarm.update(20.0, 0.0, &mut players, &rules, &config.enemies, ARENA, &mut rng);
        let enemy = &swarm.enemies()[0];
        assert_eq!(enemy.state, EnemyState::Chase);
        // 150/100 speed boost over one nominal frame
        assert!((enemy.pos.x - 502.25).abs() < 1e-3);
    }

    #[test]
    fn test_contact_kills_and_relaxes() {
        let config = GameConfig::default();
        let rules = ModeRules::for_mode(GameMode::Survival, &config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut swarm = swarm_with(vec![Enemy::new(Vec2::new(500.0, 300.0), 0.0, 1.5, 8.0)]);
        let mut players = vec![survivor(1, Vec2::new(505.0, 300.0))];

        let collisions = swarm.update(20.0, 0.0, &mut players, &rules, &config.enemies, ARENA, &mut rng);
        assert_eq!(collisions.len(), 1);
        assert_eq!(players[0].lives, 2);
        assert!(players[0].has_shield(0.0));
        assert!(swarm.enemies()[0].is_relaxed(4999.0));
        assert!(!swarm.enemies()[0].is_relaxed(5000.0));
    }

    #[test]
    fn test_shield_blocks_enemy() {
        let config = GameConfig::default();
        let rules = ModeRules::for_mode(GameMode::Survival, &config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut swarm = swarm_with(vec![Enemy::new(Vec2::new(500.0, 300.0), 0.0, 1.5, 8.0)]);
        let mut players = vec![survivor(1, Vec2::new(505.0, 300.0))];
        players[0].activate_shield(1000.0, 0.0);

        let collisions = swarm.update(20.0, 0.0, &mut players, &rules, &config.enemies, ARENA, &mut rng);
        assert!(collisions.is_empty());
        assert_eq!(players[0].lives, 3);
        assert_eq!(swarm.enemies()[0].state, EnemyState::Relax);
    }

    #[test]
    fn test_bounce_off_wall() {
        let mut enemy = Enemy::new(Vec2::new(2.0, 300.0), std::f32::consts::PI, 1.5, 8.0);
        enemy.bounce(ARENA);
        assert_eq!(enemy.pos.x, 8.0);
        assert!(enemy.angle.abs() < 1e-6);
    }
}
