use geo::LineString;

/// Kilometres per degree at the equator.
///
/// Applied to both axes, so lengths are only meaningful at low latitudes.
/// This is a flat approximation, not a geodesic distance.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Planar length of a line string in degrees.
pub fn planar_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|segment| segment.dx().hypot(segment.dy())).sum()
}

/// Convert a planar length in degrees to kilometres.
pub fn degrees_to_km(degrees: f64) -> f64 {
    degrees * KM_PER_DEGREE
}
