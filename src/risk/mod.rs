use geo::{BooleanOps, Intersects, LineString, MultiLineString};

use crate::domain::{Coordinate, FloodZone};
use crate::geometry::{degrees_to_km, planar_length};

/// Lowest weight a declared zone risk can bring a zone down to.
pub const MIN_RISK_MULTIPLIER: f64 = 0.5;

/// Scale applied to the length-weighted risk density.
const SCORE_SCALE: f64 = 10.0;

/// Flood exposure of a single path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskResult {
    pub score: f64,
    pub intersection_count: usize,
}

/// Weight of a zone's contribution: its declared risk floored at 0.5, or 1.0 if undeclared.
pub fn risk_multiplier(zone: &FloodZone) -> f64 {
    zone.risk
        .map(|risk| risk.max(MIN_RISK_MULTIPLIER))
        .unwrap_or(1.0)
}

/// Score how much of `path` runs through flood zones.
///
/// # Algorithm
/// 1. Measure the path in degrees and convert to km (flat 111.32 km/degree)
/// 2. Zero-length paths score 0 with no intersections
/// 3. For every non-empty zone the path touches:
///    - count the zone once
///    - clip the path to the zone and sum the clipped pieces' lengths
///    - weight that length by the zone's risk multiplier
/// 4. Score = weighted flooded km / total km * 10 (not clamped)
pub fn score(path: &[Coordinate], zones: &[FloodZone]) -> RiskResult {
    let line: LineString<f64> = path.iter().map(|&c| geo::Coord::from(c)).collect();

    let total_km = degrees_to_km(planar_length(&line));
    if total_km <= 0.0 {
        return RiskResult::default();
    }

    let clip_input = MultiLineString::new(vec![line.clone()]);
    let mut intersection_count = 0;
    let mut base_score = 0.0;

    for zone in zones {
        if zone.is_empty() || !zone.area.0.iter().any(|polygon| line.intersects(polygon)) {
            continue;
        }
        intersection_count += 1;

        // Point-only contact clips to nothing (or to zero-length pieces)
        let inside = zone.area.clip(&clip_input, false);
        let inside_deg: f64 = inside.0.iter().map(planar_length).sum();

        base_score += degrees_to_km(inside_deg) * risk_multiplier(zone);
    }

    RiskResult {
        score: (base_score / total_km) * SCORE_SCALE,
        intersection_count,
    }
}
