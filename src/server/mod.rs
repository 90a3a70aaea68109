//! HTTP surface of the service.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{HealthResponse, LatLng, OptimizeRouteRequest, RouteResponse};

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::RouteProvider;
use crate::zones::FloodZones;

/// Shared, read-only state handed to every request.
///
/// `provider` is `None` when no provider key is configured.
pub struct AppState<P> {
    pub zones: Arc<FloodZones>,
    pub provider: Option<Arc<P>>,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            zones: self.zones.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<P: RouteProvider> AppState<P> {
    pub fn new(zones: Arc<FloodZones>, provider: Option<P>) -> Self {
        Self {
            zones,
            provider: provider.map(Arc::new),
        }
    }
}

/// Build the application router with permissive CORS and request tracing.
pub fn app<P: RouteProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route("/flood-zones", get(handlers::flood_zones::<P>))
        .route("/health", get(handlers::health::<P>))
        .route("/optimize-route", post(handlers::optimize_route::<P>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
