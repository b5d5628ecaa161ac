//! Player entity: motion, trail growth and timed status effects

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::rules::DeathConsequence;
use super::timer::PausableTimer;
use crate::consts::*;
use crate::settings::{DifficultySettings, PlayerDefaults};

/// Small positive player identity
pub type PlayerId = u8;

/// A recorded trail point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Quadratic control point for smooth rendering (collision ignores it)
    pub control: Option<Vec2>,
    /// Clock sample when the point was recorded
    pub created_at: f64,
}

/// Transient effects, all driven by pausable timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffects {
    pub speed_multiplier: f32,
    pub speed_boost: PausableTimer,
    pub shield: PausableTimer,
    /// Movement lock (infinite mode respawn)
    pub lock: PausableTimer,
    /// Visual only
    pub collision_flash: PausableTimer,
    /// Capture mode: time left to get back home
    pub home_countdown: PausableTimer,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            speed_boost: PausableTimer::new(),
            shield: PausableTimer::new(),
            lock: PausableTimer::new(),
            collision_flash: PausableTimer::new(),
            home_countdown: PausableTimer::new(),
        }
    }
}

impl StatusEffects {
    fn timers_mut(&mut self) -> [&mut PausableTimer; 5] {
        [
            &mut self.speed_boost,
            &mut self.shield,
            &mut self.lock,
            &mut self.collision_flash,
            &mut self.home_countdown,
        ]
    }

    /// Drop effects whose end time has passed
    pub fn expire(&mut self, now: f64) {
        if self.speed_boost.is_set() && !self.speed_boost.is_active(now) {
            self.speed_boost.cancel();
            self.speed_multiplier = 1.0;
        }
        if self.shield.is_set() && !self.shield.is_active(now) {
            self.shield.cancel();
        }
        if self.collision_flash.is_set() && !self.collision_flash.is_active(now) {
            self.collision_flash.cancel();
        }
    }

    pub fn pause(&mut self, now: f64) {
        for timer in self.timers_mut() {
            timer.pause(now);
        }
    }

    pub fn resume(&mut self, now: f64) {
        for timer in self.timers_mut() {
            timer.resume(now);
        }
    }

    /// Clear all effects, keeping the paused state of the timers
    fn clear(&mut self) {
        self.speed_multiplier = 1.0;
        for timer in self.timers_mut() {
            timer.cancel();
        }
    }

    /// Idle timers for a new round, unpaused
    fn reset(&mut self) {
        self.speed_multiplier = 1.0;
        for timer in self.timers_mut() {
            timer.reset();
        }
    }
}

/// What a death did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathResult {
    Respawned,
    Eliminated,
}

/// A player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub pos: Vec2,
    /// Fixed spawn point, also the return-to-base target
    pub spawn: Vec2,
    /// Unit vector of the last non-zero direction
    pub heading: Vec2,
    spawn_heading: Vec2,
    /// Per-axis direction, each component in {-1, 0, 1}
    pub direction: IVec2,
    pub is_moving: bool,
    /// Base speed in units per nominal frame
    pub speed: f32,
    /// Collision radius
    pub size: f32,
    pub trail: VecDeque<TrailPoint>,
    /// Current trail cap (power-ups can raise it for the round)
    pub trail_length: usize,
    base_trail_length: usize,
    pub trail_spacing: f32,
    pub lives: u32,
    pub alive: bool,
    /// Territory share, 0-100
    pub score: f32,
    pub effects: StatusEffects,
    /// Next infinite mode lockout
    lock_ms: f64,
    base_lock_ms: f64,
    lock_increment_ms: f64,
}

impl Player {
    pub fn new(id: PlayerId, spawn: Vec2, heading: Vec2, defaults: &PlayerDefaults) -> Self {
        Self {
            id,
            pos: spawn,
            spawn,
            heading,
            spawn_heading: heading,
            direction: IVec2::ZERO,
            is_moving: false,
            speed: 0.0,
            size: defaults.size,
            trail: VecDeque::new(),
            trail_length: 0,
            base_trail_length: 0,
            trail_spacing: defaults.trail_spacing,
            lives: 1,
            alive: true,
            score: 0.0,
            effects: StatusEffects::default(),
            lock_ms: defaults.lock_ms,
            base_lock_ms: defaults.lock_ms,
            lock_increment_ms: defaults.lock_increment_ms,
        }
    }

    /// Apply speed and trail cap for a difficulty level
    pub fn apply_difficulty(&mut self, settings: &DifficultySettings) {
        self.speed = settings.speed;
        self.base_trail_length = settings.trail_length;
        self.trail_length = settings.trail_length;
        self.truncate_trail();
    }

    /// Full reset for a new round; territory is owned by the store
    pub fn reset(&mut self, lives: u32) {
        self.place_at_spawn();
        self.effects.reset();
        self.lives = lives;
        self.alive = true;
        self.score = 0.0;
        self.trail_length = self.base_trail_length;
        self.lock_ms = self.base_lock_ms;
    }

    fn place_at_spawn(&mut self) {
        self.pos = self.spawn;
        self.heading = self.spawn_heading;
        self.direction = IVec2::ZERO;
        self.is_moving = false;
        self.trail.clear();
    }

    /// Steer the player; ignored while dead or locked
    pub fn set_direction(&mut self, dx: i32, dy: i32, now: f64) {
        if !self.alive || self.is_locked(now) {
            return;
        }
        self.direction = IVec2::new(dx.signum(), dy.signum());
        self.is_moving = self.direction != IVec2::ZERO;
        if self.is_moving {
            self.heading = self.direction.as_vec2().normalize();
        }
    }

    #[inline]
    pub fn is_locked(&self, now: f64) -> bool {
        self.effects.lock.is_active(now)
    }

    #[inline]
    pub fn has_shield(&self, now: f64) -> bool {
        self.effects.shield.is_active(now)
    }

    /// Only an active shield allows entering enemy territory
    #[inline]
    pub fn can_enter_enemy_territory(&self, now: f64) -> bool {
        self.has_shield(now)
    }

    /// Advance one physics step of `dt_ms` inside an arena of `arena_size`
    pub fn update(&mut self, dt_ms: f64, now: f64, arena_size: Vec2) {
        if !self.alive || self.is_locked(now) {
            return;
        }
        self.effects.expire(now);

        if self.trail.is_empty() {
            self.push_trail_point(self.pos, None, now);
        }
        if self.direction == IVec2::ZERO {
            return;
        }

        let speed = self.speed * self.effects.speed_multiplier;
        let displacement = speed * (dt_ms / NOMINAL_FRAME_MS) as f32;
        self.pos += self.direction.as_vec2() * displacement;

        let margin = Vec2::splat(self.size);
        self.pos = self.pos.max(margin).min(arena_size - margin);

        self.grow_trail(now);
    }

    /// Arc-length resampling from the last trail point toward the head
    fn grow_trail(&mut self, now: f64) {
        let Some(anchor) = self.trail.back().map(|p| p.pos) else {
            return;
        };
        let offset = self.pos - anchor;
        let dist = offset.length();
        if dist < self.trail_spacing {
            return;
        }

        let step = offset / dist * self.trail_spacing;
        let count = (dist / self.trail_spacing).floor() as usize;
        for k in 1..=count {
            let control = self.control_point();
            self.push_trail_point(anchor + step * k as f32, control, now);
        }
    }

    /// Extrapolated control point from the two newest trail points
    fn control_point(&self) -> Option<Vec2> {
        let len = self.trail.len();
        if len < 2 {
            return None;
        }
        let prev = self.trail[len - 2].pos;
        let last = self.trail[len - 1].pos;
        Some(prev + (last - prev) * CONTROL_POINT_FACTOR)
    }

    fn push_trail_point(&mut self, pos: Vec2, control: Option<Vec2>, now: f64) {
        self.trail.push_back(TrailPoint {
            pos,
            control,
            created_at: now,
        });
        self.truncate_trail();
    }

    fn truncate_trail(&mut self) {
        while self.trail.len() > self.trail_length {
            self.trail.pop_front();
        }
    }

    /// Give up the live trail (spent by an enclosure)
    pub fn take_trail(&mut self) -> Vec<Vec2> {
        self.trail.drain(..).map(|p| p.pos).collect()
    }

    /// The single death path: lose a life, then respawn or leave the round
    pub fn die(&mut self, consequence: DeathConsequence, now: f64) -> DeathResult {
        self.lives = self.lives.saturating_sub(1);
        let result = match consequence {
            DeathConsequence::Eliminate => DeathResult::Eliminated,
            DeathConsequence::LoseLifeAndRespawn if self.lives > 0 => {
                self.respawn();
                DeathResult::Respawned
            }
            DeathConsequence::RespawnWithLockout { refill_lives } if self.lives > 0 => {
                self.lives = refill_lives;
                self.respawn();
                self.effects.lock.start(now, self.lock_ms);
                self.lock_ms += self.lock_increment_ms;
                DeathResult::Respawned
            }
            _ => DeathResult::Eliminated,
        };
        if result == DeathResult::Eliminated {
            self.alive = false;
            self.halt();
        }
        self.effects.collision_flash.start(now, COLLISION_FLASH_MS);
        log::debug!(
            "player {} died ({:?}), {} lives left",
            self.id,
            result,
            self.lives
        );
        result
    }

    /// Fresh spawn state; territory is untouched
    fn respawn(&mut self) {
        self.place_at_spawn();
        self.effects.clear();
    }

    /// Stop in place and drop the trail
    fn halt(&mut self) {
        self.trail.clear();
        self.direction = IVec2::ZERO;
        self.is_moving = false;
    }

    pub fn apply_speed_boost(&mut self, multiplier: f32, duration_ms: f64, now: f64) {
        self.effects.speed_multiplier = multiplier;
        self.effects.speed_boost.start(now, duration_ms);
    }

    pub fn activate_shield(&mut self, duration_ms: f64, now: f64) {
        self.effects.shield.start(now, duration_ms);
    }

    pub fn add_trail_length(&mut self, amount: usize) {
        self.trail_length += amount;
    }

    /// Capture mode return-home rule. Returns true once the countdown ran out.
    pub fn track_home(&mut self, now: f64, home_radius: f32, limit_ms: f64) -> bool {
        if self.pos.distance(self.spawn) <= home_radius {
            self.effects.home_countdown.cancel();
            return false;
        }
        if !self.effects.home_countdown.is_set() {
            self.effects.home_countdown.start(now, limit_ms);
        }
        self.effects.home_countdown.has_expired(now)
    }

    /// Read-only view for renderers and UI
    pub fn snapshot(&self, now: f64) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            pos: self.pos,
            heading: self.heading,
            trail: self.trail.iter().copied().collect(),
            alive: self.alive,
            is_moving: self.is_moving,
            lives: self.lives,
            score: self.score,
            speed_multiplier: self.effects.speed_multiplier,
            speed_boost_remaining_ms: self.effects.speed_boost.remaining(now),
            shield_remaining_ms: self.effects.shield.remaining(now),
            lock_remaining_ms: self.effects.lock.remaining(now),
            home_countdown_remaining_ms: self.effects.home_countdown.remaining(now),
            flashing: self.effects.collision_flash.is_active(now),
        }
    }
}

/// Renderer/UI view of a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub pos: Vec2,
    pub heading: Vec2,
    pub trail: Vec<TrailPoint>,
    pub alive: bool,
    pub is_moving: bool,
    pub lives: u32,
    pub score: f32,
    pub speed_multiplier: f32,
    pub speed_boost_remaining_ms: f64,
    pub shield_remaining_ms: f64,
    pub lock_remaining_ms: f64,
    pub home_countdown_remaining_ms: f64,
    pub flashing: bool,
}
