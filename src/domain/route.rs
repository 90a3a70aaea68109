use super::Coordinate;

/// A driving route as returned by the routing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub geometry: Vec<Coordinate>,
}

impl Route {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}
