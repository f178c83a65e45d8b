//! Error types shared across the planner.

use thiserror::Error;

/// Failures while building or issuing a route request.
///
/// "No route" is not an error: see [`crate::planner::RouteOutcome`].
#[derive(Debug, Error)]
pub enum RouteError {
    /// Missing or malformed origin/destination. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Non-success HTTP status or an API-level error field from the provider.
    #[error("routing provider error{}: {message}", status_suffix(.status))]
    Provider { status: Option<u16>, message: String },

    /// Transport failure, including timeouts.
    #[error("network error: {0}")]
    Network(String),

    /// Provider body was not JSON, or lacked the fields a route needs.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A polyline string that cannot be rendered as a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// Input ended inside a value (last group had the continuation bit set,
    /// or a latitude had no matching longitude).
    #[error("polyline truncated at offset {offset}")]
    Truncated { offset: usize },

    /// Character outside the encoding alphabet.
    #[error("invalid polyline character {ch:?} at offset {offset}")]
    InvalidCharacter { offset: usize, ch: char },

    /// A value needs more bits than a coordinate can hold.
    #[error("polyline value overflows at offset {offset}")]
    Overflow { offset: usize },

    /// A decoded point lies outside WGS84 latitude/longitude bounds.
    #[error("polyline point {index} is outside coordinate bounds")]
    OutOfRange { index: usize },

    /// Decoded fine, but a route needs at least two points.
    #[error("polyline decoded to {count} point(s), need at least 2")]
    TooFewPoints { count: usize },
}

/// Failures reading or writing the blockage store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid blockage: {0}")]
    Invalid(String),

    #[error("store lock poisoned")]
    Poisoned,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;
