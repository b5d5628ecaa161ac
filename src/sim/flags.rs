//! Capture mode flags

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::point_in_polygon;
use super::player::{Player, PlayerId};
use crate::settings::{ArenaSettings, FlagSettings};

/// Placement attempts per flag before giving up
const MAX_PLACEMENT_ATTEMPTS: usize = 100;
/// Flags keep this far from the arena edge
const EDGE_MARGIN: f32 = 50.0;
/// Flags avoid vertical strips around these arena fractions
const LANE_FRACTIONS: [f32; 2] = [0.35, 0.65];
const LANE_HALF_WIDTH: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub pos: Vec2,
    pub size: f32,
    pub captured_by: Option<PlayerId>,
}

/// All flags of a capture round
#[derive(Debug, Clone, Default)]
pub struct FlagField {
    flags: Vec<Flag>,
}

impl FlagField {
    /// Scatter flags away from spawns, from each other and from the lanes
    pub fn place(settings: &FlagSettings, arena: &ArenaSettings, rng: &mut impl Rng) -> Self {
        let mut field = Self::default();
        if arena.width <= 2.0 * EDGE_MARGIN || arena.height <= 2.0 * EDGE_MARGIN {
            log::warn!("arena too small for flags");
            return field;
        }
        let spawns = [arena.spawn_point(0), arena.spawn_point(1)];

        for index in 0..settings.count {
            let placed = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
                let candidate = Vec2::new(
                    rng.random_range(EDGE_MARGIN..arena.width - EDGE_MARGIN),
                    rng.random_range(EDGE_MARGIN..arena.height - EDGE_MARGIN),
                );
                field
                    .is_valid_position(candidate, &spawns, settings, arena.width)
                    .then_some(candidate)
            });
            match placed {
                Some(pos) => field.flags.push(Flag {
                    pos,
                    size: settings.size,
                    captured_by: None,
                }),
                None => log::warn!(
                    "no valid position for flag {} after {MAX_PLACEMENT_ATTEMPTS} attempts",
                    index + 1
                ),
            }
        }
        field
    }

    fn is_valid_position(
        &self,
        pos: Vec2,
        spawns: &[Vec2; 2],
        settings: &FlagSettings,
        arena_width: f32,
    ) -> bool {
        let avoid = 2.0 * settings.size;
        for spawn in spawns {
            let offset = (pos - *spawn).abs();
            if offset.x < avoid && offset.y < avoid {
                return false;
            }
            if pos.distance(*spawn) < settings.min_distance_from_spawn {
                return false;
            }
        }
        if self
            .flags
            .iter()
            .any(|f| f.pos.distance(pos) < settings.min_distance_between)
        {
            return false;
        }
        LANE_FRACTIONS
            .iter()
            .all(|fraction| (pos.x - arena_width * fraction).abs() >= LANE_HALF_WIDTH)
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Hand every flag inside a freshly enclosed polygon to `id`
    pub fn capture_in(&mut self, polygon: &[Vec2], id: PlayerId) -> usize {
        let mut captured = 0;
        for flag in &mut self.flags {
            if flag.captured_by != Some(id) && point_in_polygon(flag.pos, polygon) {
                flag.captured_by = Some(id);
                captured += 1;
            }
        }
        if captured > 0 {
            log::debug!("player {id} captured {captured} flag(s)");
        }
        captured
    }

    /// Flags of players that are out of the round become neutral again
    pub fn release_dead(&mut self, players: &[Player]) {
        for flag in &mut self.flags {
            let Some(owner) = flag.captured_by else {
                continue;
            };
            if !players.iter().any(|p| p.id == owner && p.alive) {
                log::debug!("flag released by player {owner}");
                flag.captured_by = None;
            }
        }
    }

    pub fn count_for(&self, id: PlayerId) -> usize {
        self.flags
            .iter()
            .filter(|f| f.captured_by == Some(id))
            .count()
    }

    /// True when `pos` is within `clearance` of any flag
    pub fn is_near_flag(&self, pos: Vec2, clearance: f32) -> bool {
        self.flags
            .iter()
            .any(|f| f.pos.distance(pos) < f.size + clearance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerDefaults;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_placement_constraints() {
        let settings = FlagSettings::default();
        let arena = ArenaSettings::default();
        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let field = FlagField::place(&settings, &arena, &mut rng);
            assert!(field.flags().len() <= settings.count);
            for (i, flag) in field.flags().iter().enumerate() {
                for spawn in [arena.spawn_point(0), arena.spawn_point(1)] {
                    assert!(flag.pos.distance(spawn) >= settings.min_distance_from_spawn);
                }
                for lane in [0.35 * arena.width, 0.65 * arena.width] {
                    assert!((flag.pos.x - lane).abs() >= 60.0);
                }
                for other in &field.flags()[i + 1..] {
                    assert!(flag.pos.distance(other.pos) >= settings.min_distance_between);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_flags() {
        let settings = FlagSettings::default();
        let arena = ArenaSettings::default();
        let a = FlagField::place(&settings, &arena, &mut Pcg32::seed_from_u64(7));
        let b = FlagField::place(&settings, &arena, &mut Pcg32::seed_from_u64(7));
        assert_eq!(a.flags(), b.flags());
    }

    fn field_with(positions: &[Vec2]) -> FlagField {
        FlagField {
            flags: positions
                .iter()
                .map(|&pos| Flag {
                    pos,
                    size: 25.0,
                    captured_by: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_capture_and_steal() {
        let mut field = field_with(&[Vec2::new(50.0, 50.0), Vec2::new(500.0, 500.0)]);
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
        ];
        assert_eq!(field.capture_in(&square, 1), 1);
        assert_eq!(field.count_for(1), 1);
        assert_eq!(field.capture_in(&square, 1), 0);
        assert_eq!(field.capture_in(&square, 2), 1);
        assert_eq!(field.count_for(1), 0);
        assert_eq!(field.count_for(2), 1);
    }

    #[test]
    fn test_release_when_owner_dead() {
        let mut field = field_with(&[Vec2::new(50.0, 50.0)]);
        field.flags[0].captured_by = Some(1);
        let mut owner = Player::new(1, Vec2::ZERO, Vec2::X, &PlayerDefaults::default());
        field.release_dead(std::slice::from_ref(&owner));
        assert_eq!(field.count_for(1), 1);
        owner.alive = false;
        field.release_dead(std::slice::from_ref(&owner));
        assert_eq!(field.count_for(1), 0);
    }
}
