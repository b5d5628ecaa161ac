//! Loop Arena headless demo
//!
//! Runs a scripted match between two bots that trace growing squares from
//! their spawn points, driving the simulation through the scheduler with
//! simulated display frames. Prints the result as JSON.
//!
//! Usage: `loop-arena [mode] [difficulty] [seed]`

use std::error::Error;

use glam::Vec2;
use loop_arena::sim::{Game, GameEvent, GameState, PlayerId};
use loop_arena::{Difficulty, GameConfig, GameMode};

/// Simulated display refresh interval
const FRAME_MS: f64 = 16.0;
/// Give up after this much simulated time
const MAX_RUN_MS: f64 = 600_000.0;
/// A waypoint counts as reached within this distance on both axes
const REACH: f32 = 3.0;

/// Steers a player around a list of waypoints, one axis direction at a time
struct SquareBot {
    id: PlayerId,
    waypoints: Vec<Vec2>,
    next: usize,
}

impl SquareBot {
    /// Laps of growing squares starting and ending at `spawn`
    ///
    /// `toward_center` is +1 when the arena center lies to the right.
    fn new(id: PlayerId, spawn: Vec2, toward_center: f32, sides: &[f32]) -> Self {
        let mut waypoints = Vec::new();
        for &side in sides {
            waypoints.push(spawn + Vec2::new(0.0, -side));
            waypoints.push(spawn + Vec2::new(toward_center * side, -side));
            waypoints.push(spawn + Vec2::new(toward_center * side, 0.0));
            waypoints.push(spawn);
        }
        Self {
            id,
            waypoints,
            next: 0,
        }
    }

    fn steer(&mut self, pos: Vec2) -> (i32, i32) {
        let mut delta = self.waypoints[self.next] - pos;
        if delta.x.abs() <= REACH && delta.y.abs() <= REACH {
            self.next = (self.next + 1) % self.waypoints.len();
            delta = self.waypoints[self.next] - pos;
        }
        let axis = |v: f32| {
            if v > REACH {
                1
            } else if v < -REACH {
                -1
            } else {
                0
            }
        };
        (axis(delta.x), axis(delta.y))
    }
}

fn parse_args() -> Result<(GameMode, Difficulty, u64), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let mode = match args.next() {
        Some(name) => name.parse()?,
        None => GameMode::Fight,
    };
    let difficulty = match args.next() {
        Some(name) => name.parse()?,
        None => Difficulty::Fast,
    };
    let seed = match args.next() {
        Some(seed) => seed.parse()?,
        None => 42,
    };
    Ok((mode, difficulty, seed))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let (mode, difficulty, seed) = parse_args()?;
    log::info!(
        "Loop Arena demo: {} on {} (seed {seed})",
        mode.as_str(),
        difficulty.as_str()
    );

    let config = GameConfig::default();
    let mut bots = [
        SquareBot::new(1, config.arena.spawn_point(0), 1.0, &[120.0, 160.0, 170.0]),
        SquareBot::new(2, config.arena.spawn_point(1), -1.0, &[100.0, 150.0, 170.0]),
    ];
    let mut game = Game::new(config, mode, difficulty, seed)?;

    let mut now = 0.0;
    let mut frames: u64 = 0;
    let mut steps: u64 = 0;
    let (mut collisions, mut pickups, mut enclosures) = (0u32, 0u32, 0u32);
    game.start(now);

    while game.state() != GameState::GameOver && now < MAX_RUN_MS {
        frames += 1;
        // One long stall and one pause to exercise the catch-up clamp and timers
        now += match frames {
            900 => 2000.0,
            _ => FRAME_MS,
        };
        if frames == 1500 {
            game.pause();
        } else if frames == 1700 {
            game.resume();
        }

        if game.state() == GameState::Playing {
            for bot in &mut bots {
                let Some(player) = game.arena().player(bot.id) else {
                    continue;
                };
                if !player.alive {
                    continue;
                }
                let (dx, dy) = bot.steer(player.pos);
                game.set_direction(bot.id, dx, dy);
            }
        }
        steps += u64::from(game.frame(now));
        for event in game.events() {
            match event {
                GameEvent::Collision(_) => collisions += 1,
                GameEvent::Pickup(_) => pickups += 1,
                GameEvent::Enclosure { .. } => enclosures += 1,
            }
        }
    }

    let snapshot = game.snapshot();
    let report = serde_json::json!({
        "mode": snapshot.mode,
        "difficulty": snapshot.difficulty,
        "state": snapshot.state,
        "frames": frames,
        "physics_steps": steps,
        "game_time_ms": snapshot.game_time_ms,
        "events": { "collisions": collisions, "pickups": pickups, "enclosures": enclosures },
        "outcome": snapshot.outcome,
        "standings": snapshot.standings,
        "territories": snapshot
            .territories
            .iter()
            .map(|t| serde_json::json!({ "player": t.player, "polygons": t.polygons.len() }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
