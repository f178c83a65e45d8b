//! Provider route requests.

use std::fmt;

use crate::avoidance::{AvoidanceRectangle, avoidance_area};
use crate::blockage::{Blockage, validate_center};
use crate::error::RouteError;

/// Ask the provider for both the encoded path and the trip summary.
pub const RETURN_FIELDS: &str = "polyline,summary";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportMode {
    #[default]
    Car,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Car => "car",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider request. Points are (lat, lng).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub transport_mode: TransportMode,
    pub origin: (f64, f64),
    pub destination: (f64, f64),
    pub avoid_area: Option<AvoidanceRectangle>,
}

impl RouteRequest {
    /// Same trip with the avoidance area dropped.
    pub fn without_avoidance(&self) -> Self {
        Self {
            avoid_area: None,
            ..self.clone()
        }
    }

    /// Query parameters in provider order. Credentials are added by the client.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("transportMode", self.transport_mode.to_string()),
            ("origin", format_point(self.origin)),
            ("destination", format_point(self.destination)),
            ("return", RETURN_FIELDS.to_string()),
        ];
        if let Some(area) = &self.avoid_area {
            pairs.push(("avoid[areas]", area.to_param()));
        }
        pairs
    }
}

fn format_point((lat, lng): (f64, f64)) -> String {
    format!("{lat},{lng}")
}

/// Builds the request for a trip around the given active blockages.
///
/// Zero blockages emit no avoidance area, one uses its own rectangle, and
/// several are merged into one enclosing rectangle.
pub fn build_route_request(
    origin: (f64, f64),
    destination: (f64, f64),
    active_blockages: &[Blockage],
) -> Result<RouteRequest, RouteError> {
    validate_center(origin.0, origin.1)
        .map_err(|err| RouteError::Validation(format!("origin: {err}")))?;
    validate_center(destination.0, destination.1)
        .map_err(|err| RouteError::Validation(format!("destination: {err}")))?;

    Ok(RouteRequest {
        transport_mode: TransportMode::Car,
        origin,
        destination,
        avoid_area: avoidance_area(active_blockages),
    })
}
