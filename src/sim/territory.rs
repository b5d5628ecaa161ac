//! Territory store, loop enclosure and rasterized scoring

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use glam::Vec2;

use super::geometry::{self, Polygon};
use super::player::{Player, PlayerId};
use crate::consts::*;

#[derive(Debug, Clone, Copy)]
struct CachedScore {
    key: u64,
    score: f32,
}

/// Closed polygons claimed by each player
#[derive(Debug, Clone)]
pub struct TerritoryStore {
    width: f32,
    height: f32,
    polygons: BTreeMap<PlayerId, Vec<Polygon>>,
    score_cache: HashMap<PlayerId, CachedScore>,
}

impl TerritoryStore {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            polygons: BTreeMap::new(),
            score_cache: HashMap::new(),
        }
    }

    /// Drop every polygon (round reset)
    pub fn clear(&mut self) {
        self.polygons.clear();
        self.score_cache.clear();
    }

    pub fn polygons(&self, id: PlayerId) -> &[Polygon] {
        self.polygons.get(&id).map_or(&[], Vec::as_slice)
    }

    /// All territories in ascending player id order
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &[Polygon])> {
        self.polygons.iter().map(|(id, polys)| (*id, polys.as_slice()))
    }

    /// Store a polygon for `id`, oriented clockwise. Degenerate input is skipped.
    pub fn add_polygon(&mut self, id: PlayerId, mut polygon: Polygon) -> bool {
        if polygon.len() < 3 {
            log::trace!("skipping degenerate polygon for player {id}");
            return false;
        }
        geometry::orient_clockwise(&mut polygon);
        self.polygons.entry(id).or_default().push(polygon);
        self.score_cache.remove(&id);
        true
    }

    /// True when `point` lies inside any polygon owned by `id`
    pub fn owns_point(&self, id: PlayerId, point: Vec2) -> bool {
        self.polygons(id)
            .iter()
            .any(|poly| geometry::point_in_polygon(point, poly))
    }

    /// Close the player's loop if they are back home with a long enough trail
    ///
    /// The polygon runs along the trail, through the current position and
    /// back to the spawn point. The trail is consumed on success.
    pub fn detect_enclosure(&mut self, player: &mut Player, home_radius: f32) -> Option<Polygon> {
        if !player.alive || player.trail.len() < MIN_ENCLOSURE_POINTS {
            return None;
        }
        if player.pos.distance(player.spawn) >= home_radius {
            return None;
        }

        let mut polygon = player.take_trail();
        polygon.push(player.pos);
        polygon.push(player.spawn);
        geometry::orient_clockwise(&mut polygon);

        log::debug!(
            "player {} enclosed a {}-point loop (area {:.0})",
            player.id,
            polygon.len(),
            geometry::signed_area(&polygon).abs()
        );
        self.add_polygon(player.id, polygon.clone());
        Some(polygon)
    }

    /// Territory share of `id` in [0, 100], cached by polygon content
    pub fn score(&mut self, id: PlayerId) -> f32 {
        let key = self.content_key(id);
        if let Some(cached) = self.score_cache.get(&id)
            && cached.key == key
        {
            return cached.score;
        }
        let score = self.compute_score(id);
        self.score_cache.insert(id, CachedScore { key, score });
        score
    }

    fn content_key(&self, id: PlayerId) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.to_bits().hash(&mut hasher);
        self.height.to_bits().hash(&mut hasher);
        for poly in self.polygons(id) {
            poly.len().hash(&mut hasher);
            for p in poly {
                p.x.to_bits().hash(&mut hasher);
                p.y.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    fn compute_score(&self, id: PlayerId) -> f32 {
        let polygons = self.polygons(id);
        if polygons.is_empty() {
            return 0.0;
        }
        let mut coverage = Coverage::new(self.width, self.height, SCORE_SAMPLE_STRIDE);
        for poly in polygons {
            coverage.fill(poly);
        }
        let covered_area = coverage.covered_area();
        let capturable = CAPTURABLE_AREA_FRACTION as f64 * self.width as f64 * self.height as f64;
        (covered_area * MAX_SCORE as f64 / capturable).min(MAX_SCORE as f64) as f32
    }
}

/// Coverage bitmap sampled on a stride grid over the arena
///
/// Samples sit at pixel centers. Each polygon is filled with the nonzero
/// rule; the bitmap holds the union of every fill.
struct Coverage {
    stride: usize,
    cols: usize,
    rows: usize,
    covered: Vec<bool>,
}

impl Coverage {
    fn new(width: f32, height: f32, stride: usize) -> Self {
        let stride = stride.max(1);
        let cols = (width.max(0.0) as usize).div_ceil(stride);
        let rows = (height.max(0.0) as usize).div_ceil(stride);
        Self {
            stride,
            cols,
            rows,
            covered: vec![false; cols * rows],
        }
    }

    #[inline]
    fn sample_coord(&self, index: usize) -> f32 {
        (index * self.stride) as f32 + 0.5
    }

    /// First sample column whose center is at or right of `x`
    fn first_col_at_or_after(&self, x: f32) -> usize {
        let col = ((x - 0.5) / self.stride as f32).ceil();
        if col <= 0.0 {
            0
        } else {
            (col as usize).min(self.cols)
        }
    }

    fn fill(&mut self, polygon: &[Vec2]) {
        if polygon.len() < 3 {
            log::trace!("skipping degenerate polygon during rasterization");
            return;
        }
        let Some((min, max)) = geometry::bounds(polygon) else {
            return;
        };

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for row in 0..self.rows {
            let y = self.sample_coord(row);
            if y < min.y || y > max.y {
                continue;
            }

            crossings.clear();
            for (i, &p1) in polygon.iter().enumerate() {
                let p2 = polygon[(i + 1) % polygon.len()];
                let upward = p1.y <= y && p2.y > y;
                let downward = p2.y <= y && p1.y > y;
                if upward || downward {
                    let t = (y - p1.y) / (p2.y - p1.y);
                    let x = p1.x + t * (p2.x - p1.x);
                    crossings.push((x, if upward { 1 } else { -1 }));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let start = self.first_col_at_or_after(pair[0].0);
                let end = self.first_col_at_or_after(pair[1].0);
                let offset = row * self.cols;
                for cell in &mut self.covered[offset + start..offset + end.max(start)] {
                    *cell = true;
                }
            }
        }
    }

    /// Covered area in square arena units
    fn covered_area(&self) -> f64 {
        let samples = self.covered.iter().filter(|c| **c).count();
        (samples * self.stride * self.stride) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DifficultySettings, PlayerDefaults};

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Polygon {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x + w, y + h),
            Vec2::new(x, y + h),
        ]
    }

    #[test]
    fn test_empty_store_scores_zero() {
        let mut store = TerritoryStore::new(1200.0, 600.0);
        assert_eq!(store.score(1), 0.0);
    }

    #[test]
    fn test_rect_score_matches_area() {
        let mut store = TerritoryStore::new(1200.0, 600.0);
        store.add_polygon(1, rect(100.0, 100.0, 250.0, 250.0));
        let expected = 62_500.0 / (0.95 * 720_000.0) * 100.0;
        let score = store.score(1);
        assert!((score - expected).abs() < 0.05, "score {score}");
        assert_eq!(store.score(1), score);
    }

    #[test]
    fn test_overlapping_polygons_count_once() {
        let mut store = TerritoryStore::new(1200.0, 600.0);
        store.add_polygon(1, rect(100.0, 100.0, 200.0, 200.0));
        let single = store.score(1);
        store.add_polygon(1, rect(100.0, 100.0, 200.0, 200.0));
        assert_eq!(store.score(1), single);
        store.add_polygon(1, rect(200.0, 100.0, 200.0, 200.0));
        assert!(store.score(1) > single);
    }

    #[test]
    fn test_score_clamped() {
        let mut store = TerritoryStore::new(100.0, 100.0);
        store.add_polygon(1, rect(-10.0, -10.0, 120.0, 120.0));
        assert_eq!(store.score(1), MAX_SCORE);
    }

    #[test]
    fn test_exact_share() {
        // 760x540 covers 60% of the capturable area of a 1200x600 arena
        let mut store = TerritoryStore::new(1200.0, 600.0);
        store.add_polygon(1, rect(0.0, 0.0, 760.0, 540.0));
        assert_eq!(store.score(1), 60.0);
    }

    #[test]
    fn test_degenerate_polygon_skipped() {
        let mut store = TerritoryStore::new(1200.0, 600.0);
        assert!(!store.add_polygon(1, vec![Vec2::ZERO, Vec2::ONE]));
        assert!(store.polygons(1).is_empty());
        assert_eq!(store.score(1), 0.0);
    }

    #[test]
    fn test_stored_polygons_are_clockwise() {
        let mut store = TerritoryStore::new(1200.0, 600.0);
        store.add_polygon(2, rect(10.0, 10.0, 50.0, 50.0));
        assert!(geometry::is_clockwise(&store.polygons(2)[0]));
        assert!(store.owns_point(2, Vec2::new(30.0, 30.0)));
        assert!(!store.owns_point(1, Vec2::new(30.0, 30.0)));
    }

    #[test]
    fn test_square_loop_encloses_once() {
        let defaults = PlayerDefaults::default();
        let start = Vec2::new(100.0, 300.0);
        let mut player = Player::new(1, start, Vec2::X, &defaults);
        player.apply_difficulty(&DifficultySettings {
            speed: 5.0,
            max_time_ms: 100_000.0,
            trail_length: 1000,
        });
        let mut store = TerritoryStore::new(1200.0, 600.0);

        let legs = [(1, 0), (0, 1), (-1, 0), (0, -1)];
        let mut enclosures = Vec::new();
        'legs: for (dx, dy) in legs {
            player.set_direction(dx, dy, 0.0);
            for _ in 0..50 {
                player.update(NOMINAL_FRAME_MS, 0.0, Vec2::new(1200.0, 600.0));
                if let Some(poly) = store.detect_enclosure(&mut player, defaults.home_radius) {
                    enclosures.push(poly);
                    break 'legs;
                }
            }
        }

        assert_eq!(enclosures.len(), 1);
        assert!(player.trail.is_empty());
        assert!(geometry::is_clockwise(&enclosures[0]));
        assert_eq!(store.polygons(1).len(), 1);
        let area = geometry::signed_area(&enclosures[0]).abs();
        assert!(area > 250.0 * 230.0 && area < 250.0 * 251.0, "area {area}");
    }

    #[test]
    fn test_short_trail_never_encloses() {
        let defaults = PlayerDefaults::default();
        let mut player = Player::new(1, Vec2::new(100.0, 300.0), Vec2::X, &defaults);
        player.apply_difficulty(&DifficultySettings {
            speed: 2.0,
            max_time_ms: 100_000.0,
            trail_length: 1000,
        });
        let mut store = TerritoryStore::new(1200.0, 600.0);
        player.set_direction(1, 0, 0.0);
        for _ in 0..5 {
            player.update(NOMINAL_FRAME_MS, 0.0, Vec2::new(1200.0, 600.0));
            assert!(store.detect_enclosure(&mut player, defaults.home_radius).is_none());
        }
        assert!(!player.trail.is_empty());
    }
}
