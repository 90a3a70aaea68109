use reqwest::StatusCode;
use thiserror::Error;

/// Longest slice of an upstream error body kept in messages.
pub const MAX_UPSTREAM_MESSAGE: usize = 200;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("ORS error {}: {}", .status.as_u16(), .message)]
    Upstream { status: StatusCode, message: String },

    #[error("ORS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    NoRoute(&'static str),

    #[error("ORS returned no geometry coordinates")]
    EmptyGeometry,
}

impl RouteError {
    /// Build an upstream error, keeping at most the first 200 characters of the body.
    pub fn upstream(status: StatusCode, body: &str) -> Self {
        Self::Upstream {
            status,
            message: body.chars().take(MAX_UPSTREAM_MESSAGE).collect(),
        }
    }
}
