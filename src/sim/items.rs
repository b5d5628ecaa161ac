//! Power-up items

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::flags::FlagField;
use super::player::{Player, PlayerId};
use super::timer::PausableTimer;
use crate::settings::{ArenaSettings, ItemSettings};

const MAX_PLACEMENT_ATTEMPTS: usize = 50;
const EDGE_MARGIN: f32 = 20.0;
const MIN_DISTANCE_FROM_SPAWN: f32 = 150.0;
const MIN_DISTANCE_FROM_LAST: f32 = 300.0;
/// Extra pickup reach beyond the item radius
const PICKUP_MARGIN: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Speed,
    Length,
    Shield,
}

impl ItemKind {
    const ALL: [ItemKind; 3] = [ItemKind::Speed, ItemKind::Length, ItemKind::Shield];

    /// Weighted pick; `weights` follows the order of `ALL`
    fn pick(weights: &[u32; 3], rng: &mut impl Rng) -> Self {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return ItemKind::Speed;
        }
        let mut roll = rng.random_range(0..total);
        for (kind, weight) in Self::ALL.iter().zip(weights) {
            if roll < *weight {
                return *kind;
            }
            roll -= weight;
        }
        ItemKind::Speed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub radius: f32,
    lifetime: PausableTimer,
}

/// A pickup that happened this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub player: PlayerId,
    pub kind: ItemKind,
}

/// Spawns, expires and hands out power-ups
#[derive(Debug, Clone, Default)]
pub struct ItemField {
    items: Vec<Item>,
    spawn_timer: PausableTimer,
    /// Position of the most recent spawn
    last_spawn: Option<Vec2>,
}

impl ItemField {
    pub fn clear(&mut self) {
        self.items.clear();
        self.spawn_timer.reset();
        self.last_spawn = None;
    }

    /// Arm the spawn clock for a new round
    pub fn begin(&mut self, now: f64, settings: &ItemSettings) {
        self.spawn_timer.start(now, settings.spawn_interval_ms);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Expire old items and spawn a new one when the interval elapsed
    pub fn update(
        &mut self,
        now: f64,
        settings: &ItemSettings,
        arena: &ArenaSettings,
        flags: &FlagField,
        rng: &mut impl Rng,
    ) {
        self.items.retain(|item| item.lifetime.is_active(now));

        if self.spawn_timer.is_set() && self.spawn_timer.has_expired(now) {
            self.spawn(now, settings, arena, flags, rng);
            self.spawn_timer.start(now, settings.spawn_interval_ms);
        }
    }

    fn spawn(
        &mut self,
        now: f64,
        settings: &ItemSettings,
        arena: &ArenaSettings,
        flags: &FlagField,
        rng: &mut impl Rng,
    ) {
        if arena.width <= 2.0 * EDGE_MARGIN || arena.height <= 2.0 * EDGE_MARGIN {
            return;
        }
        let spawns = [arena.spawn_point(0), arena.spawn_point(1)];
        let position = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
            let candidate = Vec2::new(
                rng.random_range(EDGE_MARGIN..arena.width - EDGE_MARGIN),
                rng.random_range(EDGE_MARGIN..arena.height - EDGE_MARGIN),
            );
            let clear_of_spawns = spawns
                .iter()
                .all(|s| s.distance(candidate) >= MIN_DISTANCE_FROM_SPAWN);
            let clear_of_last = self
                .last_spawn
                .is_none_or(|last| last.distance(candidate) >= MIN_DISTANCE_FROM_LAST);
            let clear_of_flags = !flags.is_near_flag(candidate, settings.radius);
            (clear_of_spawns && clear_of_last && clear_of_flags).then_some(candidate)
        });

        let Some(pos) = position else {
            log::trace!("no room for a new item");
            return;
        };
        let kind = ItemKind::pick(&settings.weights, rng);
        self.items.push(Item {
            kind,
            pos,
            radius: settings.radius,
            lifetime: PausableTimer::started(now, settings.lifetime_ms),
        });
        self.last_spawn = Some(pos);
    }

    /// Each living player takes at most one item per step
    pub fn collect(&mut self, players: &mut [Player], settings: &ItemSettings, now: f64) -> Vec<Pickup> {
        let mut pickups = Vec::new();
        for player in players.iter_mut().filter(|p| p.alive) {
            let Some(index) = self
                .items
                .iter()
                .position(|item| player.pos.distance(item.pos) < item.radius + PICKUP_MARGIN)
            else {
                continue;
            };
            let item = self.items.remove(index);
            match item.kind {
                ItemKind::Speed => player.apply_speed_boost(
                    settings.speed_multiplier,
                    settings.speed_duration_ms,
                    now,
                ),
                ItemKind::Length => player.add_trail_length(settings.length_bonus),
                ItemKind::Shield => player.activate_shield(settings.shield_duration_ms, now),
            }
            log::debug!("player {} picked up {:?}", player.id, item.kind);
            pickups.push(Pickup {
                player: player.id,
                kind: item.kind,
            });
        }
        pickups
    }

    pub fn pause(&mut self, now: f64) {
        self.spawn_timer.pause(now);
        for item in &mut self.items {
            item.lifetime.pause(now);
        }
    }

    pub fn resume(&mut self, now: f64) {
        self.spawn_timer.resume(now);
        for item in &mut self.items {
            item.lifetime.resume(now);
        }
    }

    #[cfg(test)]
    fn insert(&mut self, kind: ItemKind, pos: Vec2, now: f64, settings: &ItemSettings) {
        self.items.push(Item {
            kind,
            pos,
            radius: settings.radius,
            lifetime: PausableTimer::started(now, settings.lifetime_ms),
        });
    }
}
