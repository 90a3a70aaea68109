use anyhow::{Context, Result, bail};
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::FloodZone;

/// CRS names accepted as WGS84 longitude/latitude.
const WGS84_NAMES: &[&str] = &[
    "EPSG:4326",
    "urn:ogc:def:crs:EPSG::4326",
    "urn:ogc:def:crs:EPSG:6.6:4326",
    "urn:ogc:def:crs:OGC:1.3:CRS84",
    "urn:ogc:def:crs:OGC::CRS84",
    "OGC:CRS84",
    "CRS84",
];

type Ring = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ZoneGeometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
    #[serde(other)]
    Unsupported,
}

/// The flood-zone collection loaded at startup.
///
/// Holds both the parsed zones used for scoring and the source GeoJSON
/// document, which is served back unchanged.
#[derive(Debug)]
pub struct FloodZones {
    zones: Vec<FloodZone>,
    document: Value,
}

impl FloodZones {
    /// Load a GeoJSON FeatureCollection from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read flood zones from {}", path.display()))?;
        let document: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;
        let zones = parse_flood_zones(&document)?;

        info!(
            path = %path.display(),
            zones = zones.len(),
            skipped = zones.iter().filter(|z| z.is_empty()).count(),
            "Loaded flood zones"
        );

        Ok(Self { zones, document })
    }

    pub fn from_parts(zones: Vec<FloodZone>, document: Value) -> Self {
        Self { zones, document }
    }

    pub fn zones(&self) -> &[FloodZone] {
        &self.zones
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Parse a GeoJSON FeatureCollection into flood zones.
///
/// # Algorithm
/// 1. Reject documents whose legacy `crs` member names anything but WGS84
/// 2. For each feature:
///    - Polygon / MultiPolygon geometry becomes the zone area
///    - null, unsupported or malformed geometry becomes an empty zone
///    - a numeric `properties.risk` becomes the zone's risk weight
pub fn parse_flood_zones(document: &Value) -> Result<Vec<FloodZone>> {
    check_crs(document)?;

    if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        bail!("Flood zone data must be a GeoJSON FeatureCollection");
    }

    let features = document
        .get("features")
        .and_then(Value::as_array)
        .context("FeatureCollection has no features array")?;

    let zones = features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let area = feature
                .get("geometry")
                .and_then(|g| parse_area(g, index))
                .unwrap_or_else(|| MultiPolygon::new(Vec::new()));

            let risk = feature
                .get("properties")
                .and_then(|p| p.get("risk"))
                .and_then(Value::as_f64);

            FloodZone { area, risk }
        })
        .collect();

    Ok(zones)
}

fn check_crs(document: &Value) -> Result<()> {
    let Some(crs) = document.get("crs").filter(|c| !c.is_null()) else {
        return Ok(());
    };

    let name = crs
        .pointer("/properties/name")
        .and_then(Value::as_str)
        .context("GeoJSON crs member has no name")?;

    if WGS84_NAMES.iter().any(|known| known.eq_ignore_ascii_case(name)) {
        Ok(())
    } else {
        bail!(
            "Flood zones use CRS {}; reproject them to WGS84 (EPSG:4326) first",
            name
        )
    }
}

fn parse_area(geometry: &Value, index: usize) -> Option<MultiPolygon<f64>> {
    if geometry.is_null() {
        debug!(feature = index, "Flood zone has no geometry");
        return None;
    }

    let parsed = match serde_json::from_value::<ZoneGeometry>(geometry.clone()) {
        Ok(g) => g,
        Err(e) => {
            debug!(feature = index, error = %e, "Malformed flood zone geometry");
            return None;
        }
    };

    let polygons = match parsed {
        ZoneGeometry::Polygon { coordinates } => vec![to_polygon(&coordinates)?],
        ZoneGeometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|rings| to_polygon(rings))
            .collect::<Option<Vec<_>>>()?,
        ZoneGeometry::Unsupported => {
            debug!(feature = index, "Flood zone geometry is not a polygon");
            return None;
        }
    };

    Some(MultiPolygon::new(polygons))
}

fn to_polygon(rings: &[Ring]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    let interiors = interiors
        .iter()
        .map(|ring| to_ring(ring))
        .collect::<Option<Vec<_>>>()?;

    Some(Polygon::new(to_ring(exterior)?, interiors))
}

/// Positions shorter than [x, y] make the whole ring unusable.
fn to_ring(ring: &Ring) -> Option<LineString<f64>> {
    ring.iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(geo::coord! { x: *x, y: *y }),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}
