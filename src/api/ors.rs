use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

use super::cache::{KEY_DECIMALS, RouteCache, RouteKey};
use super::error::RouteError;
use super::retry::RetryPolicy;
use crate::config::RoutingConfig;
use crate::domain::{Coordinate, Route};

const DIRECTIONS_PATH: &str = "/v2/directions/driving-car/geojson";
const USER_AGENT: &str = concat!("floodroute/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a start and end into a driving route.
pub trait RouteProvider: Send + Sync + 'static {
    fn resolve(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> impl Future<Output = Result<Arc<Route>, RouteError>> + Send;
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
}

/// OpenRouteService directions response (a GeoJSON FeatureCollection)
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsFeature {
    #[serde(default)]
    pub geometry: Option<LineGeometry>,
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize)]
pub struct LineGeometry {
    #[serde(default)]
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub summary: Option<Summary>,
}

/// ORS omits zero-valued summary fields.
#[derive(Debug, Deserialize, Default)]
pub struct Summary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

impl DirectionsResponse {
    /// Extract the first route, rejecting empty or non-positive results.
    pub fn into_route(self) -> Result<Route, RouteError> {
        let feature = self
            .features
            .into_iter()
            .next()
            .ok_or(RouteError::NoRoute("ORS returned no route features"))?;

        let summary = feature
            .properties
            .and_then(|p| p.summary)
            .unwrap_or_default();

        if summary.distance <= 0.0 || summary.duration <= 0.0 {
            return Err(RouteError::NoRoute(
                "ORS returned non-positive distance or duration",
            ));
        }

        let geometry: Vec<Coordinate> = feature
            .geometry
            .map(|g| g.coordinates)
            .unwrap_or_default()
            .iter()
            .filter_map(|position| match position.as_slice() {
                [lng, lat, ..] => Some(Coordinate::new(*lng, *lat)),
                _ => None,
            })
            .collect();

        if geometry.is_empty() {
            return Err(RouteError::EmptyGeometry);
        }

        Ok(Route {
            distance_meters: summary.distance,
            duration_seconds: summary.duration,
            geometry,
        })
    }
}

/// OpenRouteService client with bounded concurrency, retries and memoization.
pub struct OrsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
    permits: Semaphore,
    cache: RouteCache,
}

impl OrsClient {
    pub fn new(api_key: String, config: &RoutingConfig) -> Result<Self, RouteError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), DIRECTIONS_PATH),
            api_key,
            retry: config.retry_policy(),
            permits: Semaphore::new(config.max_concurrency.max(1)),
            cache: RouteCache::new(config.cache_capacity),
        })
    }

    async fn fetch(&self, start: Coordinate, end: Coordinate) -> Result<Route, RouteError> {
        let body = DirectionsRequest {
            coordinates: [start.position(), end.position()],
        };

        let response = {
            // acquire only fails on a closed semaphore and this one is never closed
            let _permit = self.permits.acquire().await.ok();

            self.retry
                .run(|| {
                    debug!(endpoint = %self.endpoint, "Requesting route from ORS");
                    self.http
                        .post(&self.endpoint)
                        .header(AUTHORIZATION, &self.api_key)
                        .json(&body)
                        .send()
                })
                .await?
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RouteError::upstream(status, &text));
        }

        let parsed: DirectionsResponse = response.json().await?;
        parsed.into_route()
    }
}

impl RouteProvider for OrsClient {
    async fn resolve(&self, start: Coordinate, end: Coordinate) -> Result<Arc<Route>, RouteError> {
        let key = RouteKey::new(start, end, &self.api_key);
        if let Some(route) = self.cache.get(&key) {
            debug!("Route served from cache");
            return Ok(route);
        }

        let route = Arc::new(
            self.fetch(start.rounded(KEY_DECIMALS), end.rounded(KEY_DECIMALS))
                .await?,
        );
        self.cache.insert(key, route.clone());
        Ok(route)
    }
}
