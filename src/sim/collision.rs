//! Collision detection and resolution between players
//!
//! Heads are circles of the player's size. Trails are tested point by point
//! (resampling keeps them evenly spaced), territory with the winding number.

use serde::{Deserialize, Serialize};

use super::geometry::circles_overlap;
use super::player::{Player, PlayerId};
use super::rules::{ModeRules, TrailRule};
use super::territory::TerritoryStore;

/// Result of testing one player's head against another player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    None,
    HeadCollision,
    TrailCollision,
}

/// What kind of contact caused a death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    Head,
    Trail,
    Territory,
    Enemy,
}

/// A resolved collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub kind: CollisionKind,
    /// The player whose head caused the contact
    pub player: PlayerId,
    /// Opposing player, if the contact was with a player
    pub opponent: Option<PlayerId>,
}

/// Test `a`'s head against `b`'s head and trail
///
/// Head contact is checked first and takes precedence.
pub fn check_pair(a: &Player, b: &Player) -> CollisionOutcome {
    if circles_overlap(a.pos, a.size, b.pos, b.size) {
        return CollisionOutcome::HeadCollision;
    }
    let radius_sq = a.size * a.size;
    if b.trail.iter().any(|p| a.pos.distance_squared(p.pos) < radius_sq) {
        return CollisionOutcome::TrailCollision;
    }
    CollisionOutcome::None
}

/// True when `a` stands in `owner`'s territory without a shield
pub fn intrudes_territory(a: &Player, territory: &TerritoryStore, owner: PlayerId, now: f64) -> bool {
    !a.can_enter_enemy_territory(now) && territory.owns_point(owner, a.pos)
}

/// Resolve all player-vs-player contacts for one physics step
///
/// Players are visited in slice order, which the arena keeps sorted by id.
/// Deaths apply immediately, so a player killed earlier in the pass is no
/// longer tested. Each player stops at its first contact.
pub fn resolve(
    players: &mut [Player],
    territory: &TerritoryStore,
    rules: &ModeRules,
    now: f64,
) -> Vec<Collision> {
    let mut collisions = Vec::new();

    for i in 0..players.len() {
        for j in 0..players.len() {
            if i == j || !players[i].alive || !players[j].alive {
                continue;
            }
            let (a_id, b_id) = (players[i].id, players[j].id);

            let collision = match check_pair(&players[i], &players[j]) {
                CollisionOutcome::HeadCollision => {
                    rules.kill(&mut players[i], now);
                    rules.kill(&mut players[j], now);
                    Some(CollisionKind::Head)
                }
                CollisionOutcome::TrailCollision => {
                    let victim = match rules.trail_rule {
                        TrailRule::CrasherDies => i,
                        TrailRule::OwnerDies => j,
                    };
                    rules.kill(&mut players[victim], now);
                    Some(CollisionKind::Trail)
                }
                CollisionOutcome::None => {
                    if intrudes_territory(&players[i], territory, b_id, now) {
                        rules.kill(&mut players[i], now);
                        Some(CollisionKind::Territory)
                    } else {
                        None
                    }
                }
            };

            if let Some(kind) = collision {
                log::debug!("collision {kind:?}: player {a_id} vs player {b_id}");
                collisions.push(Collision {
                    kind,
                    player: a_id,
                    opponent: Some(b_id),
                });
                break;
            }
        }
    }

    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DifficultySettings, GameConfig};
    use crate::sim::player::TrailPoint;
    use crate::sim::rules::GameMode;
    use glam::Vec2;

    fn make_player(id: PlayerId, x: f32, y: f32, lives: u32) -> Player {
        let config = GameConfig::default();
        let mut player = Player::new(id, Vec2::new(x, y), Vec2::X, &config.player);
        player.apply_difficulty(&DifficultySettings {
            speed: 3.0,
            max_time_ms: 100_000.0,
            trail_length: 500,
        });
        player.lives = lives;
        player
    }

    fn lay_trail(player: &mut Player, points: &[Vec2]) {
        for &pos in points {
            player.trail.push_back(TrailPoint {
                pos,
                control: None,
                created_at: 0.0,
            });
        }
    }

    fn rules(mode: GameMode) -> ModeRules {
        ModeRules::for_mode(mode, &GameConfig::default())
    }

    #[test]
    fn test_head_collision_takes_precedence() {
        let a = make_player(1, 100.0, 100.0, 1);
        let mut b = make_player(2, 110.0, 100.0, 1);
        lay_trail(&mut b, &[Vec2::new(102.0, 100.0)]);
        assert_eq!(check_pair(&a, &b), CollisionOutcome::HeadCollision);
    }

    #[test]
    fn test_trail_collision_uses_crasher_radius() {
        let a = make_player(1, 100.0, 100.0, 1);
        let mut b = make_player(2, 300.0, 100.0, 1);
        lay_trail(&mut b, &[Vec2::new(100.0, 108.0)]);
        assert_eq!(check_pair(&a, &b), CollisionOutcome::None);
        lay_trail(&mut b, &[Vec2::new(100.0, 107.9)]);
        assert_eq!(check_pair(&a, &b), CollisionOutcome::TrailCollision);
    }

    #[test]
    fn test_explore_head_on_kills_both() {
        let mut players = vec![make_player(1, 100.0, 100.0, 1), make_player(2, 112.0, 100.0, 1)];
        let territory = TerritoryStore::new(1200.0, 600.0);
        let collisions = resolve(&mut players, &territory, &rules(GameMode::Explore), 0.0);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].kind, CollisionKind::Head);
        assert!(!players[0].alive && !players[1].alive);
    }

    #[test]
    fn test_trail_rule_picks_victim() {
        let territory = TerritoryStore::new(1200.0, 600.0);

        let mut players = vec![make_player(1, 100.0, 100.0, 1), make_player(2, 300.0, 100.0, 1)];
        lay_trail(&mut players[1], &[Vec2::new(101.0, 100.0)]);
        resolve(&mut players, &territory, &rules(GameMode::Explore), 0.0);
        assert!(!players[0].alive);
        assert!(players[1].alive);

        let mut players = vec![make_player(1, 100.0, 100.0, 3), make_player(2, 300.0, 100.0, 3)];
        lay_trail(&mut players[1], &[Vec2::new(101.0, 100.0)]);
        resolve(&mut players, &territory, &rules(GameMode::Fight), 0.0);
        assert_eq!(players[0].lives, 3);
        assert_eq!(players[1].lives, 2);
        assert!(players[1].trail.is_empty());
    }

    #[test]
    fn test_first_contact_in_id_order_wins() {
        let territory = TerritoryStore::new(1200.0, 600.0);
        let mut players = vec![
            make_player(1, 100.0, 100.0, 3),
            make_player(2, 300.0, 100.0, 3),
            make_player(3, 500.0, 100.0, 3),
        ];
        // Player 1's head touches the trails of both 2 and 3
        lay_trail(&mut players[1], &[Vec2::new(101.0, 100.0)]);
        lay_trail(&mut players[2], &[Vec2::new(99.0, 100.0)]);

        let collisions = resolve(&mut players, &territory, &rules(GameMode::Fight), 0.0);
        assert_eq!(
            collisions,
            vec![Collision {
                kind: CollisionKind::Trail,
                player: 1,
                opponent: Some(2),
            }]
        );
        assert_eq!(players[1].lives, 2);
        assert_eq!(players[2].lives, 3);
        assert_eq!(players[2].trail.len(), 1);
    }

    #[test]
    fn test_territory_intrusion_and_shield() {
        let mut territory = TerritoryStore::new(1200.0, 600.0);
        territory.add_polygon(
            2,
            vec![
                Vec2::new(50.0, 50.0),
                Vec2::new(150.0, 50.0),
                Vec2::new(150.0, 150.0),
                Vec2::new(50.0, 150.0),
            ],
        );

        let mut players = vec![make_player(1, 100.0, 100.0, 1), make_player(2, 500.0, 300.0, 1)];
        players[0].activate_shield(1000.0, 0.0);
        assert!(resolve(&mut players, &territory, &rules(GameMode::Explore), 10.0).is_empty());
        assert!(players[0].alive);

        let collisions = resolve(&mut players, &territory, &rules(GameMode::Explore), 2000.0);
        assert_eq!(collisions[0].kind, CollisionKind::Territory);
        assert!(!players[0].alive);
    }

    #[test]
    fn test_own_territory_is_safe() {
        let mut territory = TerritoryStore::new(1200.0, 600.0);
        territory.add_polygon(
            1,
            vec![
                Vec2::new(50.0, 50.0),
                Vec2::new(150.0, 50.0),
                Vec2::new(150.0, 150.0),
                Vec2::new(50.0, 150.0),
            ],
        );
        let mut players = vec![make_player(1, 100.0, 100.0, 1), make_player(2, 500.0, 300.0, 1)];
        assert!(resolve(&mut players, &territory, &rules(GameMode::Explore), 0.0).is_empty());
    }
}
