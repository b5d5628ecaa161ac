//! Planar geometry helpers
//!
//! Coordinates are arena units with y pointing down, as the host renders them.
//! "Clockwise" below follows the y-up math convention: a polygon is clockwise
//! when its shoelace signed area is negative.

use glam::Vec2;

/// Closed polygon, last point implicitly joined to the first
pub type Polygon = Vec<Vec2>;

/// Shoelace signed area (positive = counter-clockwise in y-up convention)
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, p1) in polygon.iter().enumerate() {
        let p2 = polygon[(i + 1) % polygon.len()];
        twice_area += p1.x * p2.y - p2.x * p1.y;
    }
    twice_area / 2.0
}

/// True when the polygon already has the stored (clockwise) orientation
#[inline]
pub fn is_clockwise(polygon: &[Vec2]) -> bool {
    signed_area(polygon) <= 0.0
}

/// Reverse the point order if needed so the polygon is clockwise
pub fn orient_clockwise(polygon: &mut Polygon) {
    if !is_clockwise(polygon) {
        polygon.reverse();
    }
}

/// Cross product sign of `point` relative to the directed edge `a -> b`
#[inline]
fn is_left(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    (b.x - a.x) * (point.y - a.y) - (point.x - a.x) * (b.y - a.y)
}

/// Winding number of `polygon` around `point`
///
/// Upward edge crossings with the point on their left count +1, downward
/// crossings with the point on their right count -1.
pub fn winding_number(point: Vec2, polygon: &[Vec2]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }
    let mut winding = 0;
    for (i, &p1) in polygon.iter().enumerate() {
        let p2 = polygon[(i + 1) % polygon.len()];
        if p1.y <= point.y {
            if p2.y > point.y && is_left(p1, p2, point) > 0.0 {
                winding += 1;
            }
        } else if p2.y <= point.y && is_left(p1, p2, point) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Nonzero-rule containment; degenerate polygons contain nothing
#[inline]
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    winding_number(point, polygon) != 0
}

/// Shortest distance from `point` to the segment `a -> b`
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Axis-aligned bounds of a point set as (min, max)
pub fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(x: f32, y: f32, side: f32) -> Polygon {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + side, y),
            Vec2::new(x + side, y + side),
            Vec2::new(x, y + side),
        ]
    }

    #[test]
    fn test_signed_area_square() {
        let sq = square(0.0, 0.0, 10.0);
        assert!((signed_area(&sq) - 100.0).abs() < 1e-4);
        assert!(!is_clockwise(&sq));
    }

    #[test]
    fn test_orient_clockwise_reverses_once() {
        let mut sq = square(0.0, 0.0, 10.0);
        orient_clockwise(&mut sq);
        assert!(signed_area(&sq) < 0.0);
        let before = sq.clone();
        orient_clockwise(&mut sq);
        assert_eq!(before, sq);
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = vec![Vec2::ZERO, Vec2::new(5.0, 5.0)];
        assert_eq!(signed_area(&line), 0.0);
        assert!(!point_in_polygon(Vec2::new(1.0, 1.0), &line));
    }

    #[test]
    fn test_winding_orientation_independent() {
        let sq = square(0.0, 0.0, 10.0);
        let mut rev = sq.clone();
        rev.reverse();
        let inside = Vec2::new(5.0, 5.0);
        assert_eq!(winding_number(inside, &sq), -winding_number(inside, &rev));
        assert!(point_in_polygon(inside, &sq));
        assert!(point_in_polygon(inside, &rev));
        assert!(!point_in_polygon(Vec2::new(15.0, 5.0), &sq));
    }

    #[test]
    fn test_self_overlapping_loop_is_nonzero() {
        // Trace the same square twice: winding 2, still inside
        let mut twice = square(0.0, 0.0, 10.0);
        twice.extend(square(0.0, 0.0, 10.0));
        assert_eq!(winding_number(Vec2::new(5.0, 5.0), &twice).abs(), 2);
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!((point_segment_distance(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((point_segment_distance(Vec2::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-5);
        assert!((point_segment_distance(Vec2::new(1.0, 1.0), a, a) - 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_circles_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 8.0, Vec2::new(15.0, 0.0), 8.0));
        assert!(!circles_overlap(Vec2::ZERO, 8.0, Vec2::new(16.0, 0.0), 8.0));
    }

    fn arb_polygon() -> impl Strategy<Value = Polygon> {
        prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 3..24)
            .prop_map(|pts| pts.into_iter().map(|(x, y)| Vec2::new(x, y)).collect())
    }

    proptest! {
        #[test]
        fn prop_signed_area_flips_on_reverse(poly in arb_polygon()) {
            let mut rev = poly.clone();
            rev.reverse();
            let a = signed_area(&poly);
            let b = signed_area(&rev);
            // Rounding error scales with the magnitude of the cross terms
            let scale: f32 = poly
                .iter()
                .zip(poly.iter().cycle().skip(1))
                .map(|(p1, p2)| (p1.x * p2.y).abs() + (p2.x * p1.y).abs())
                .sum();
            prop_assert!((a + b).abs() <= scale * 1e-5 + 1e-3);
        }

        #[test]
        fn prop_regular_polygon_contains_center(
            cx in -300.0f32..300.0,
            cy in -300.0f32..300.0,
            radius in 5.0f32..200.0,
            sides in 3usize..32,
        ) {
            let center = Vec2::new(cx, cy);
            let poly: Polygon = (0..sides)
                .map(|i| {
                    let theta = i as f32 / sides as f32 * std::f32::consts::TAU;
                    center + Vec2::new(theta.cos(), theta.sin()) * radius
                })
                .collect();
            prop_assert!(point_in_polygon(center, &poly));

            let (min, max) = bounds(&poly).unwrap();
            prop_assert_eq!(winding_number(max + Vec2::splat(10.0), &poly), 0);
            prop_assert_eq!(winding_number(min - Vec2::new(50.0, 0.0), &poly), 0);
        }

        #[test]
        fn prop_far_points_are_outside(poly in arb_polygon(), dx in 1.0f32..1000.0, dy in -1000.0f32..1000.0) {
            let (_, max) = bounds(&poly).unwrap();
            let far = Vec2::new(max.x + dx, dy);
            prop_assert_eq!(winding_number(far, &poly), 0);
        }
    }
}
