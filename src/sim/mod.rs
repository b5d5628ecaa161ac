//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, driven by [`Scheduler`]
//! - Seeded RNG only
//! - Stable iteration order (by player id)
//! - Time passed in explicitly, never read from a global clock
//! - No rendering or platform dependencies

pub mod arena;
pub mod collision;
pub mod daynight;
pub mod enemies;
pub mod flags;
pub mod game;
pub mod geometry;
pub mod items;
pub mod player;
pub mod rules;
pub mod scheduler;
pub mod territory;
pub mod timer;

pub use arena::{Arena, GameEvent, PLAYER_COUNT};
pub use collision::{Collision, CollisionKind, CollisionOutcome, check_pair, resolve};
pub use daynight::DayPhase;
pub use enemies::{Enemy, EnemyState, EnemySwarm};
pub use flags::{Flag, FlagField};
pub use game::{Game, Snapshot, TerritorySnapshot};
pub use geometry::Polygon;
pub use items::{Item, ItemField, ItemKind, Pickup};
pub use player::{Player, PlayerId, PlayerSnapshot, TrailPoint};
pub use rules::{
    DeathConsequence, GameMode, MatchOutcome, ModeRules, Standing, TrailRule, evaluate_winner,
};
pub use scheduler::{GameState, Scheduler, Simulation, StepOutcome};
pub use territory::TerritoryStore;
pub use timer::PausableTimer;
