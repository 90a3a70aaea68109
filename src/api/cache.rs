use mini_moka::sync::Cache;
use std::sync::Arc;

use crate::domain::{Coordinate, Route};

/// Decimal places kept when keying routes.
pub const KEY_DECIMALS: i32 = 5;

/// Routes keyed by start/end rounded to 5 decimals plus the provider key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    start: (i64, i64),
    end: (i64, i64),
    api_key: String,
}

impl RouteKey {
    pub fn new(start: Coordinate, end: Coordinate, api_key: &str) -> Self {
        Self {
            start: quantize(start),
            end: quantize(end),
            api_key: api_key.to_string(),
        }
    }
}

fn quantize(c: Coordinate) -> (i64, i64) {
    let factor = 10f64.powi(KEY_DECIMALS);
    ((c.lng * factor).round() as i64, (c.lat * factor).round() as i64)
}

/// Bounded memo of resolved routes; the least useful entries go first once full.
#[derive(Clone)]
pub struct RouteCache {
    inner: Cache<RouteKey, Arc<Route>>,
}

impl RouteCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn get(&self, key: &RouteKey) -> Option<Arc<Route>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: RouteKey, route: Arc<Route>) {
        self.inner.insert(key, route);
    }
}
