use geo::MultiPolygon;

/// A flood-prone area with an optional declared risk weight.
#[derive(Debug, Clone)]
pub struct FloodZone {
    pub area: MultiPolygon<f64>,
    pub risk: Option<f64>,
}

impl FloodZone {
    pub fn new(area: MultiPolygon<f64>) -> Self {
        Self { area, risk: None }
    }

    pub fn with_risk(area: MultiPolygon<f64>, risk: f64) -> Self {
        Self {
            area,
            risk: Some(risk),
        }
    }

    /// A zone with no geometry at all. Kept so feature order matches the source data.
    pub fn empty() -> Self {
        Self::new(MultiPolygon::new(Vec::new()))
    }

    /// True when there is nothing usable to intersect against: no polygons, an
    /// exterior ring with fewer than three positions, or non-finite coordinates.
    pub fn is_empty(&self) -> bool {
        if self.area.0.is_empty() {
            return true;
        }

        self.area.0.iter().any(|polygon| {
            let exterior = polygon.exterior();
            exterior.0.len() < 3
                || std::iter::once(exterior)
                    .chain(polygon.interiors())
                    .flat_map(|ring| ring.0.iter())
                    .any(|c| !c.x.is_finite() || !c.y.is_finite())
        })
    }
}
