pub mod cache;
pub mod error;
pub mod ors;
pub mod retry;

pub use cache::{RouteCache, RouteKey};
pub use error::RouteError;
pub use ors::{DirectionsResponse, OrsClient, RouteProvider};
pub use retry::{HasStatus, RetryPolicy, is_transient};
