//! Route planning around active blockages.
//!
//! The planner trusts the provider's native avoidance: when a route comes
//! back, every active blockage is reported as avoided. The returned path is
//! not checked against the blockage circles.

use tracing::{debug, info, warn};

use crate::blockage::Blockage;
use crate::error::RouteError;
use crate::request::{RouteRequest, build_route_request};
use crate::traits::{ProviderRoutes, RoutingProvider};

/// A route the provider found.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    /// Encoded polyline, as returned by the provider.
    pub polyline: String,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Number of active blockages the request avoided.
    pub blockages_considered: usize,
}

/// Result of a planning attempt. Both "no route" cases are outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(PlannedRoute),
    /// A route exists, but not one that avoids the merged avoidance area.
    /// Carries every blockage active for the request; they are jointly the
    /// cause, though none is individually verified.
    BlockedByAvoidance { blockages: Vec<Blockage> },
    /// The points are not connected even with no avoidance at all.
    UnreachableDestination,
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found(_))
    }
}

/// Plans a route from `origin` to `destination` (both (lat, lng)) around the
/// given active blockages.
///
/// Issues the constrained request and, only if it returns no routes, a
/// second unconstrained request to tell the two no-route cases apart. The
/// two calls are strictly sequential.
pub fn plan_route<P: RoutingProvider + ?Sized>(
    provider: &P,
    origin: (f64, f64),
    destination: (f64, f64),
    active_blockages: &[Blockage],
) -> Result<RouteOutcome, RouteError> {
    let request = build_route_request(origin, destination, active_blockages)?;
    if let Some(area) = &request.avoid_area {
        info!(
            blockages = active_blockages.len(),
            area = %area,
            "requesting route with avoidance area"
        );
        for blockage in active_blockages {
            debug!(id = %blockage.id, blockage = %blockage.label(), "avoiding blockage");
        }
    } else {
        info!("requesting route without avoidance");
    }

    let routes = provider.request_route(&request)?;
    if routes.is_empty() {
        if request.avoid_area.is_none() {
            // Already unconstrained; a retry would ask the same question.
            warn!("provider found no route");
            return Ok(RouteOutcome::UnreachableDestination);
        }
        return classify_no_route(provider, &request, active_blockages);
    }

    let route = first_route(routes, active_blockages.len())?;
    info!(
        distance_km = route.distance_meters / 1000.0,
        duration_min = (route.duration_seconds / 60.0).round(),
        "route found"
    );
    Ok(RouteOutcome::Found(route))
}

/// Classifies a constrained request that returned no routes by re-issuing it
/// without the avoidance area.
pub fn classify_no_route<P: RoutingProvider + ?Sized>(
    provider: &P,
    constrained: &RouteRequest,
    active_blockages: &[Blockage],
) -> Result<RouteOutcome, RouteError> {
    info!("no route with avoidance, checking whether any route exists");
    let unconstrained = provider.request_route(&constrained.without_avoidance())?;

    if unconstrained.is_empty() {
        warn!("no route exists even without avoidance");
        Ok(RouteOutcome::UnreachableDestination)
    } else {
        warn!(
            blockages = active_blockages.len(),
            "blockages block every route between origin and destination"
        );
        Ok(RouteOutcome::BlockedByAvoidance {
            blockages: active_blockages.to_vec(),
        })
    }
}

fn first_route(routes: ProviderRoutes, blockages_considered: usize) -> Result<PlannedRoute, RouteError> {
    let Some(route) = routes.routes.into_iter().next() else {
        return Err(RouteError::MalformedResponse("no routes".to_string()));
    };
    let Some(section) = route.sections.into_iter().next() else {
        return Err(RouteError::MalformedResponse("route has no sections".to_string()));
    };
    let (Some(distance_meters), Some(duration_seconds)) =
        (section.length_meters, section.duration_seconds)
    else {
        return Err(RouteError::MalformedResponse(
            "route section has no summary".to_string(),
        ));
    };
    let Some(polyline) = section.polyline.filter(|p| !p.is_empty()) else {
        return Err(RouteError::MalformedResponse(
            "route section has no polyline".to_string(),
        ));
    };

    Ok(PlannedRoute {
        polyline,
        distance_meters,
        duration_seconds,
        blockages_considered,
    })
}
