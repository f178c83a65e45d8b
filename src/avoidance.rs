//! Avoidance areas derived from blockages.
//!
//! The routing provider accepts a single axis-aligned avoidance rectangle per
//! request. Each blockage circle is over-approximated by its bounding square,
//! and several squares are over-approximated by the one box enclosing them
//! all. No blockage is ever left unavoided; the cost is that free space
//! between distant blockages is avoided too, which can make a route
//! impossible even though one exists.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blockage::Blockage;

/// Meters per degree, taken at the equator and applied at every latitude.
///
/// Longitude degrees shrink toward the poles, so away from the equator the
/// east/west extent of a rectangle undershoots the true radius. This is a
/// known approximation and intentionally left uncorrected.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Axis-aligned bounding box in degrees. `west <= east`, `south <= north`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvoidanceRectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl AvoidanceRectangle {
    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.west <= other.west
            && self.south <= other.south
            && self.east >= other.east
            && self.north >= other.north
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Provider parameter value, `bbox:west,south,east,north`.
    pub fn to_param(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AvoidanceRectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bbox:{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Blockage radius converted to degrees.
pub fn degrees_radius(blockage: &Blockage) -> f64 {
    blockage.radius / METERS_PER_DEGREE
}

/// Bounding square of a blockage circle.
pub fn rectangle_for(blockage: &Blockage) -> AvoidanceRectangle {
    let d = degrees_radius(blockage);
    AvoidanceRectangle {
        west: blockage.longitude - d,
        south: blockage.latitude - d,
        east: blockage.longitude + d,
        north: blockage.latitude + d,
    }
}

/// Smallest rectangle containing every input rectangle, or `None` for no input.
///
/// Min/max are associative and commutative, so the result does not depend
/// on input order.
pub fn merge_rectangles(rectangles: &[AvoidanceRectangle]) -> Option<AvoidanceRectangle> {
    rectangles
        .iter()
        .copied()
        .reduce(AvoidanceRectangle::union)
}

/// The single avoidance rectangle for a set of active blockages.
///
/// One blockage uses its own rectangle unchanged; several are merged; none
/// yields no avoidance area at all.
pub fn avoidance_area(blockages: &[Blockage]) -> Option<AvoidanceRectangle> {
    match blockages {
        [] => None,
        [single] => Some(rectangle_for(single)),
        many => {
            let rectangles: Vec<_> = many.iter().map(rectangle_for).collect();
            merge_rectangles(&rectangles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockage::NewBlockage;
    use chrono::Utc;

    const EPS: f64 = 1e-12;

    fn blockage(lat: f64, lng: f64, radius: f64) -> Blockage {
        NewBlockage::at(lat, lng)
            .radius(radius)
            .into_blockage(Utc::now())
            .unwrap()
    }

    fn rect(west: f64, south: f64, east: f64, north: f64) -> AvoidanceRectangle {
        AvoidanceRectangle { west, south, east, north }
    }

    #[test]
    fn test_degrees_radius() {
        let b = blockage(0.0, 0.0, 111_000.0);
        assert!((degrees_radius(&b) - 1.0).abs() < EPS);
        let b = blockage(42.36, -71.06, 100.0);
        assert!((degrees_radius(&b) - 100.0 / 111_000.0).abs() < EPS);
    }

    #[test]
    fn test_rectangle_is_centered_square() {
        let b = blockage(42.36, -71.06, 250.0);
        let r = rectangle_for(&b);
        let side = 2.0 * 250.0 / METERS_PER_DEGREE;

        assert!((r.width() - side).abs() < EPS);
        assert!((r.height() - side).abs() < EPS);
        assert!(((r.west + r.east) / 2.0 - -71.06).abs() < EPS);
        assert!(((r.south + r.north) / 2.0 - 42.36).abs() < EPS);
        assert!(r.west <= r.east && r.south <= r.north);
    }

    #[test]
    fn test_merge_is_minimal_enclosing_box() {
        let inputs = [
            rect(-71.1, 42.3, -71.0, 42.4),
            rect(-71.05, 42.35, -70.9, 42.5),
            rect(-71.2, 42.38, -71.15, 42.39),
        ];
        let merged = merge_rectangles(&inputs).unwrap();

        assert_eq!(merged, rect(-71.2, 42.3, -70.9, 42.5));
        for input in &inputs {
            assert!(merged.contains(input));
        }
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = rect(-1.0, -1.0, 0.0, 0.0);
        let b = rect(0.5, 0.5, 2.0, 3.0);
        let c = rect(-4.0, 1.0, -3.0, 2.0);

        let expected = merge_rectangles(&[a, b, c]).unwrap();
        for permutation in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
            assert_eq!(merge_rectangles(&permutation).unwrap(), expected);
        }
    }

    #[test]
    fn test_merge_single_is_identity() {
        let a = rect(-71.1, 42.3, -71.0, 42.4);
        assert_eq!(merge_rectangles(&[a]), Some(a));
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert_eq!(merge_rectangles(&[]), None);
        assert_eq!(avoidance_area(&[]), None);
    }

    #[test]
    fn test_single_blockage_uses_exact_rectangle() {
        let b = blockage(42.36, -71.06, 100.0);
        assert_eq!(avoidance_area(std::slice::from_ref(&b)), Some(rectangle_for(&b)));
    }

    #[test]
    fn test_two_blockages_span_both() {
        let first = blockage(42.36, -71.06, 100.0);
        let second = blockage(42.40, -71.00, 50.0);
        let r1 = rectangle_for(&first);
        let r2 = rectangle_for(&second);

        let area = avoidance_area(&[first, second]).unwrap();
        assert_eq!(area.west, r1.west.min(r2.west));
        assert_eq!(area.south, r1.south.min(r2.south));
        assert_eq!(area.east, r1.east.max(r2.east));
        assert_eq!(area.north, r1.north.max(r2.north));
    }

    #[test]
    fn test_param_format() {
        let r = rect(-71.5, 42.25, -71.0, 42.5);
        assert_eq!(r.to_param(), "bbox:-71.5,42.25,-71,42.5");
    }
}
