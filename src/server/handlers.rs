use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::api::RouteProvider;
use crate::domain::Coordinate;
use crate::risk;

const PROVIDER: &str = "openrouteservice";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    fn to_coordinate(self, field: &'static str) -> Result<Coordinate, ApiError> {
        Coordinate::checked(self.lng, self.lat)
            .map_err(|source| ApiError::InvalidCoordinate { field, source })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRouteRequest {
    pub start: LatLng,
    pub end: LatLng,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub route_id: String,
    /// `[lng, lat]` positions
    pub geometry: Vec<[f64; 2]>,
    pub risk_score: f64,
    pub flood_intersections: usize,
    pub distance_km: f64,
    pub estimated_time_minutes: u64,
    pub warnings: Vec<String>,
    pub alternative_available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub ors_key_present: bool,
}

/// Halves go to the even neighbour: 0.125 -> 0.12.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn whole_minutes(minutes: f64) -> u64 {
    minutes.round_ties_even() as u64
}

pub async fn flood_zones<P: RouteProvider>(State(state): State<AppState<P>>) -> Json<Value> {
    Json(state.zones.document().clone())
}

pub async fn health<P: RouteProvider>(State(state): State<AppState<P>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: PROVIDER.to_string(),
        ors_key_present: state.provider.is_some(),
    })
}

#[tracing::instrument(skip_all)]
pub async fn optimize_route<P: RouteProvider>(
    State(state): State<AppState<P>>,
    Json(request): Json<OptimizeRouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let start = request.start.to_coordinate("start")?;
    let end = request.end.to_coordinate("end")?;

    let provider = state.provider.as_ref().ok_or(ApiError::MissingApiKey)?;
    let route = provider.resolve(start, end).await?;

    let result = risk::score(&route.geometry, state.zones.zones());

    let mut warnings = Vec::new();
    if result.intersection_count > 0 {
        warnings.push(format!(
            "Route passes through {} flood-prone areas",
            result.intersection_count
        ));
    }

    info!(
        points = route.geometry.len(),
        distance_km = route.distance_km(),
        risk_score = result.score,
        intersections = result.intersection_count,
        "Scored route"
    );

    Ok(Json(RouteResponse {
        route_id: Uuid::new_v4().to_string(),
        geometry: route.geometry.iter().map(Coordinate::position).collect(),
        risk_score: round2(result.score),
        flood_intersections: result.intersection_count,
        distance_km: round2(route.distance_km()),
        estimated_time_minutes: whole_minutes(route.duration_minutes()),
        warnings,
        alternative_available: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RouteError;
    use crate::domain::{FloodZone, Route};
    use crate::server::app;
    use crate::zones::FloodZones;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use geo::polygon;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedRoute(Result<Route, &'static str>);

    impl RouteProvider for FixedRoute {
        async fn resolve(&self, _start: Coordinate, _end: Coordinate) -> Result<Arc<Route>, RouteError> {
            match &self.0 {
                Ok(route) => Ok(Arc::new(route.clone())),
                Err(reason) => Err(RouteError::NoRoute(*reason)),
            }
        }
    }

    fn straight_route() -> Route {
        Route {
            distance_meters: 55_660.0,
            duration_seconds: 3_330.0,
            geometry: vec![Coordinate::new(120.0, 14.5), Coordinate::new(120.5, 14.5)],
        }
    }

    fn zones() -> Arc<FloodZones> {
        let area = polygon![
            (x: 120.2, y: 14.4),
            (x: 120.3, y: 14.4),
            (x: 120.3, y: 14.6),
            (x: 120.2, y: 14.6)
        ];
        let document = json!({"type": "FeatureCollection", "features": []});
        Arc::new(FloodZones::from_parts(
            vec![FloodZone::with_risk(area.into(), 1.0)],
            document,
        ))
    }

    fn route_request(start_lat: f64) -> Request<Body> {
        let body = json!({
            "start": {"lat": start_lat, "lng": 120.0},
            "end": {"lat": 14.5, "lng": 120.5}
        });
        Request::builder()
            .method("POST")
            .uri("/optimize-route")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_key_presence() {
        let with_key = app(AppState::new(zones(), Some(FixedRoute(Ok(straight_route())))));
        let response = with_key
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "ok", "provider": "openrouteservice", "ors_key_present": true})
        );

        let without_key = app(AppState::<FixedRoute>::new(zones(), None));
        let response = without_key
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["ors_key_present"], json!(false));
    }

    #[tokio::test]
    async fn test_flood_zones_returns_document() {
        let router = app(AppState::<FixedRoute>::new(zones(), None));
        let response = router
            .oneshot(Request::get("/flood-zones").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["type"], json!("FeatureCollection"));
    }

    #[tokio::test]
    async fn test_optimize_route_scores_route() {
        let router = app(AppState::new(zones(), Some(FixedRoute(Ok(straight_route())))));
        let response = router.oneshot(route_request(14.5)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: RouteResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.geometry, vec![[120.0, 14.5], [120.5, 14.5]]);
        assert_eq!(body.risk_score, 2.0);
        assert_eq!(body.flood_intersections, 1);
        assert_eq!(body.distance_km, 55.66);
        // 55.5 minutes ties to the even 56
        assert_eq!(body.estimated_time_minutes, 56);
        assert_eq!(body.warnings, vec!["Route passes through 1 flood-prone areas"]);
        assert!(!body.alternative_available);
        assert!(Uuid::parse_str(&body.route_id).is_ok());
    }

    #[tokio::test]
    async fn test_optimize_route_without_key() {
        let router = app(AppState::<FixedRoute>::new(zones(), None));
        let response = router.oneshot(route_request(14.5)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "ORS_API_KEY not configured"})
        );
    }

    #[tokio::test]
    async fn test_optimize_route_rejects_bad_latitude() {
        let router = app(AppState::new(zones(), Some(FixedRoute(Ok(straight_route())))));
        let response = router.oneshot(route_request(95.0)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_optimize_route_no_route() {
        let router = app(AppState::new(
            zones(),
            Some(FixedRoute(Err("ORS returned no route features"))),
        ));
        let response = router.oneshot(route_request(14.5)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "ORS returned no route features"})
        );
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.0000001), 2.0);
        assert_eq!(whole_minutes(2.5), 2);
        assert_eq!(whole_minutes(3.5), 4);
        assert_eq!(whole_minutes(2.6), 3);
    }

    #[tokio::test]
    async fn test_estimated_minutes_tie_rounds_to_even() {
        let short = Route {
            duration_seconds: 150.0,
            ..straight_route()
        };
        let router = app(AppState::new(zones(), Some(FixedRoute(Ok(short)))));
        let response = router.oneshot(route_request(14.5)).await.unwrap();

        let body: RouteResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.estimated_time_minutes, 2);
    }

    #[tokio::test]
    async fn test_dry_route_has_no_warnings() {
        let dry = Route {
            geometry: vec![Coordinate::new(121.0, 15.0), Coordinate::new(121.5, 15.0)],
            ..straight_route()
        };
        let router = app(AppState::new(zones(), Some(FixedRoute(Ok(dry)))));
        let response = router.oneshot(route_request(14.5)).await.unwrap();

        let body: RouteResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.risk_score, 0.0);
        assert_eq!(body.flood_intersections, 0);
        assert!(body.warnings.is_empty());
    }
}
