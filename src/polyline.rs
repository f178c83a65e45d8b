//! Polyline representation for route geometries.
//!
//! Providers return route geometry as a compact text polyline: each point is
//! a pair of zigzag-encoded, delta-coded integers at precision 5, written as
//! 5-bit groups offset into printable ASCII. This module only decodes; the
//! planner never produces polylines of its own.

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;

/// Coordinates are stored as integers scaled by this factor.
pub const PRECISION_FACTOR: f64 = 1e5;

const CHAR_OFFSET: u32 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const GROUP_MASK: u64 = 0x1f;
const MAX_SHIFT: u32 = 60;
const VALUE_BITS: u32 = 64;

/// A polyline representing a route geometry as decoded coordinates.
///
/// Each point is a (latitude, longitude) tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Decodes an encoded route polyline.
    ///
    /// Fails on truncated or foreign input and on anything with fewer than
    /// two points: a route that cannot be drawn must not be replaced by a
    /// straight line between the endpoints, since that line was never checked
    /// against any blockage.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        decode(encoded).map(Self::new)
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }
}

/// Decodes a precision-5 polyline into (lat, lng) points.
///
/// Each call starts from zeroed accumulators, so the same input always
/// yields the same points.
pub fn decode(encoded: &str) -> Result<Vec<(f64, f64)>, PolylineError> {
    let mut reader = VarintReader::new(encoded);
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while !reader.is_exhausted() {
        let start = reader.offset;
        lat = lat
            .checked_add(reader.next_signed()?)
            .ok_or(PolylineError::Overflow { offset: start })?;
        if reader.is_exhausted() {
            return Err(PolylineError::Truncated {
                offset: reader.offset,
            });
        }
        let start = reader.offset;
        lng = lng
            .checked_add(reader.next_signed()?)
            .ok_or(PolylineError::Overflow { offset: start })?;
        let point = (lat as f64 / PRECISION_FACTOR, lng as f64 / PRECISION_FACTOR);
        if !(-90.0..=90.0).contains(&point.0) || !(-180.0..=180.0).contains(&point.1) {
            return Err(PolylineError::OutOfRange {
                index: points.len(),
            });
        }
        points.push(point);
    }

    if points.len() < 2 {
        return Err(PolylineError::TooFewPoints {
            count: points.len(),
        });
    }
    Ok(points)
}

struct VarintReader<'a> {
    chars: std::str::Chars<'a>,
    offset: usize,
    remaining: usize,
}

impl<'a> VarintReader<'a> {
    fn new(encoded: &'a str) -> Self {
        Self {
            chars: encoded.chars(),
            offset: 0,
            remaining: encoded.chars().count(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    fn next_group(&mut self) -> Result<u64, PolylineError> {
        let ch = self.chars.next().ok_or(PolylineError::Truncated {
            offset: self.offset,
        })?;
        let code = ch as u32;
        if !(CHAR_OFFSET..CHAR_OFFSET + 64).contains(&code) {
            return Err(PolylineError::InvalidCharacter {
                offset: self.offset,
                ch,
            });
        }
        self.offset += 1;
        self.remaining -= 1;
        Ok(u64::from(code - CHAR_OFFSET))
    }

    fn next_unsigned(&mut self) -> Result<u64, PolylineError> {
        let start = self.offset;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let group = self.next_group()?;
            let bits = group & GROUP_MASK;
            if shift + 5 > VALUE_BITS && bits >> (VALUE_BITS - shift) != 0 {
                return Err(PolylineError::Overflow { offset: start });
            }
            result |= bits << shift;
            if group & CONTINUATION_BIT == 0 {
                return Ok(result);
            }
            shift += 5;
            if shift > MAX_SHIFT {
                return Err(PolylineError::Overflow { offset: start });
            }
        }
    }

    fn next_signed(&mut self) -> Result<i64, PolylineError> {
        let value = self.next_unsigned()?;
        let magnitude = (value >> 1) as i64;
        Ok(if value & 1 == 1 { !magnitude } else { magnitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference encoder, used only to produce test input.
    fn encode(points: &[(f64, f64)]) -> String {
        fn push_signed(out: &mut String, value: i64) {
            let mut v = (if value < 0 { !(value << 1) } else { value << 1 }) as u64;
            while v >= 0x20 {
                out.push(char::from_u32(((0x20 | (v & 0x1f)) + 63) as u32).unwrap());
                v >>= 5;
            }
            out.push(char::from_u32((v + 63) as u32).unwrap());
        }

        let mut out = String::new();
        let (mut prev_lat, mut prev_lng) = (0i64, 0i64);
        for &(lat, lng) in points {
            let lat = (lat * PRECISION_FACTOR).round() as i64;
            let lng = (lng * PRECISION_FACTOR).round() as i64;
            push_signed(&mut out, lat - prev_lat);
            push_signed(&mut out, lng - prev_lng);
            prev_lat = lat;
            prev_lng = lng;
        }
        out
    }

    fn assert_close(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.0 - e.0).abs() < 1e-5, "lat {} vs {}", a.0, e.0);
            assert!((a.1 - e.1).abs() < 1e-5, "lng {} vs {}", a.1, e.1);
        }
    }

    #[test]
    fn test_decode_known_string() {
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_close(&points, &[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
    }

    #[test]
    fn test_decode_inverts_encoder() {
        let route = [
            (42.36010, -71.05890),
            (42.36055, -71.05712),
            (42.35871, -71.06402),
            (42.37360, -71.10970),
            (-33.86785, 151.20732),
            (0.0, 0.0),
        ];
        let decoded = decode(&encode(&route)).unwrap();
        assert_close(&decoded, &route);
    }

    #[test]
    fn test_decode_is_repeatable() {
        let encoded = encode(&[(42.3601, -71.0589), (42.3736, -71.1097)]);
        assert_eq!(decode(&encoded).unwrap(), decode(&encoded).unwrap());
    }

    #[test]
    fn test_empty_is_too_few_points() {
        assert_eq!(decode(""), Err(PolylineError::TooFewPoints { count: 0 }));
    }

    #[test]
    fn test_single_point_is_too_few() {
        let encoded = encode(&[(42.3601, -71.0589)]);
        assert_eq!(decode(&encoded), Err(PolylineError::TooFewPoints { count: 1 }));
    }

    #[test]
    fn test_dangling_continuation_is_truncated() {
        let mut encoded = encode(&[(42.3601, -71.0589), (42.3736, -71.1097)]);
        // '_' is 0x20 + 63: a group with the continuation bit and nothing after it.
        encoded.push('_');
        assert!(matches!(decode(&encoded), Err(PolylineError::Truncated { .. })));
    }

    #[test]
    fn test_latitude_without_longitude_is_truncated() {
        let mut encoded = encode(&[(42.3601, -71.0589), (42.3736, -71.1097)]);
        encoded.push('?');
        assert!(matches!(decode(&encoded), Err(PolylineError::Truncated { offset }) if offset == encoded.len()));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(
            decode("_p~iF ps|U"),
            Err(PolylineError::InvalidCharacter { offset: 5, ch: ' ' })
        );
    }

    #[test]
    fn test_overlong_value() {
        let encoded: String = std::iter::repeat('~').take(20).collect();
        assert!(matches!(decode(&encoded), Err(PolylineError::Overflow { offset: 0 })));
    }

    #[test]
    fn test_value_wider_than_64_bits() {
        // Twelve full groups fill 60 bits; '^' carries five more with no continuation.
        let encoded = format!("{}^???", "~".repeat(12));
        assert_eq!(decode(&encoded), Err(PolylineError::Overflow { offset: 0 }));
    }

    #[test]
    fn test_value_of_exactly_64_bits() {
        // 'N' carries four bits, which is all that fits at shift 60. The value
        // decodes but lands far outside any coordinate range.
        let encoded = format!("{}N??", "~".repeat(12));
        assert_eq!(decode(&encoded), Err(PolylineError::OutOfRange { index: 0 }));
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let encoded = encode(&[(42.3601, -71.0589), (95.0, -71.0589)]);
        assert_eq!(decode(&encoded), Err(PolylineError::OutOfRange { index: 1 }));

        let encoded = encode(&[(42.3601, 181.0), (42.3736, -71.1097)]);
        assert_eq!(decode(&encoded), Err(PolylineError::OutOfRange { index: 0 }));
    }

    #[test]
    fn test_polyline_decode_and_endpoints() {
        let polyline = Polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(polyline.points().len(), 3);
        assert_eq!(polyline.first(), Some((38.5, -120.2)));
        let (lat, lng) = polyline.last().unwrap();
        assert!((lat - 43.252).abs() < 1e-9 && (lng + 126.453).abs() < 1e-9);
    }

    #[test]
    fn test_into_points() {
        let points = vec![(38.5, -120.2), (40.7, -120.95)];
        let polyline = Polyline::new(points.clone());
        let owned = polyline.into_points();
        assert_eq!(owned, points);
    }
}
