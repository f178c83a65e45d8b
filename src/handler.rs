//! Caller-facing JSON operations.
//!
//! Each handler takes a raw JSON body, talks to the store and provider it is
//! handed, and returns an HTTP-style status with a JSON body. Transport
//! (HTTP server, CLI, serverless runtime) is left to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::blockage::{Blockage, NewBlockage};
use crate::error::{RouteError, StoreError};
use crate::planner::{PlannedRoute, RouteOutcome, plan_route};
use crate::traits::{BlockageStore, RoutingProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    fn new<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(err) => {
                error!(%err, "failed to serialize response");
                Self::error(500, "Failed to serialize response", Some(err.to_string()))
            }
        }
    }

    fn error(status: u16, error: &str, details: Option<String>) -> Self {
        let mut body = json!({ "error": error });
        if let Some(details) = details {
            body["details"] = Value::String(details);
        }
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

const INVALID_POINTS: &str =
    "Invalid request. Origin and destination must be [longitude, latitude] arrays.";

/// Route request as sent by clients. Points are `[lng, lat]`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRouteRequest {
    origin: Option<Vec<f64>>,
    destination: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    avoid_blockages: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteSummary {
    distance_km: f64,
    duration_seconds: f64,
}

#[derive(Debug, Serialize)]
struct RouteBody {
    polyline: String,
    summary: RouteSummary,
}

#[derive(Debug, Serialize)]
struct BlockageReport {
    total: usize,
    avoided: Vec<Blockage>,
}

#[derive(Debug, Serialize)]
struct CalculateRouteResponse {
    route: RouteBody,
    blockages: BlockageReport,
    warnings: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum NoRouteReason {
    BlockedByAvoidance,
    UnreachableDestination,
}

#[derive(Debug, Serialize)]
struct NoRouteResponse {
    error: &'static str,
    reason: NoRouteReason,
    details: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blockages: Vec<Blockage>,
}

/// Calculates a route that avoids active blockages.
///
/// 200 with the route, 400 for a malformed request, 422 when no route can
/// be found (with the reason), 500 when the provider or network fails.
pub fn calculate_route<S, P>(store: &S, provider: &P, body: &str, now: DateTime<Utc>) -> HandlerResponse
where
    S: BlockageStore + ?Sized,
    P: RoutingProvider + ?Sized,
{
    let request: CalculateRouteRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(err) => return HandlerResponse::error(400, INVALID_POINTS, Some(err.to_string())),
    };
    let (Some(origin), Some(destination)) = (
        request.origin.as_deref().and_then(lng_lat),
        request.destination.as_deref().and_then(lng_lat),
    ) else {
        return HandlerResponse::error(400, INVALID_POINTS, None);
    };

    let mut store_failed = false;
    let blockages = if request.avoid_blockages {
        match store.active_blockages(now) {
            Ok(blockages) => {
                info!(count = blockages.len(), "loaded active blockages");
                blockages
            }
            Err(err) => {
                warn!(%err, "could not load blockages, routing without avoidance");
                store_failed = true;
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    match plan_route(provider, origin, destination, &blockages) {
        Ok(RouteOutcome::Found(route)) => {
            HandlerResponse::new(200, &route_response(route, blockages, store_failed))
        }
        Ok(RouteOutcome::BlockedByAvoidance { blockages }) => {
            let labels = blockages
                .iter()
                .map(Blockage::label)
                .collect::<Vec<_>>()
                .join(", ");
            let details = format!(
                "The {} blockage(s) ({}) are blocking all possible routes between origin and destination. \
                 Try reducing blockage radius or removing some blockages.",
                blockages.len(),
                labels
            );
            HandlerResponse::new(
                422,
                &NoRouteResponse {
                    error: "No route found",
                    reason: NoRouteReason::BlockedByAvoidance,
                    details,
                    blockages,
                },
            )
        }
        Ok(RouteOutcome::UnreachableDestination) => HandlerResponse::new(
            422,
            &NoRouteResponse {
                error: "No route found",
                reason: NoRouteReason::UnreachableDestination,
                details: "No route found between origin and destination. \
                          The locations may be unreachable by car."
                    .to_string(),
                blockages: Vec::new(),
            },
        ),
        Err(RouteError::Validation(details)) => {
            HandlerResponse::error(400, INVALID_POINTS, Some(details))
        }
        Err(err) => {
            error!(%err, "route calculation failed");
            let mut details = err.to_string();
            if matches!(err, RouteError::Provider { .. }) && blockages.len() > 1 {
                details.push_str(&format!(
                    ". With {} blockages merged into one avoidance area, a route may be impossible. \
                     Try reducing blockage radii or removing some blockages.",
                    blockages.len()
                ));
            }
            HandlerResponse::error(500, "Failed to calculate route", Some(details))
        }
    }
}

fn lng_lat(point: &[f64]) -> Option<(f64, f64)> {
    match point {
        [lng, lat] => Some((*lat, *lng)),
        _ => None,
    }
}

fn route_response(route: PlannedRoute, blockages: Vec<Blockage>, store_failed: bool) -> CalculateRouteResponse {
    let warnings = if store_failed {
        "Blockages could not be loaded; this route does not avoid any blockage.".to_string()
    } else if blockages.is_empty() {
        "No active blockages to avoid.".to_string()
    } else {
        format!("Route avoids all {} active blockage(s).", route.blockages_considered)
    };

    CalculateRouteResponse {
        route: RouteBody {
            polyline: route.polyline,
            summary: RouteSummary {
                distance_km: route.distance_meters / 1000.0,
                duration_seconds: route.duration_seconds,
            },
        },
        blockages: BlockageReport {
            total: blockages.len(),
            avoided: blockages,
        },
        warnings,
    }
}

#[derive(Debug, Serialize)]
struct AddBlockageResponse {
    message: &'static str,
    blockage: Blockage,
}

/// Records a new blockage. 201 on success.
pub fn add_blockage<S: BlockageStore + ?Sized>(store: &S, body: &str, now: DateTime<Utc>) -> HandlerResponse {
    let report: NewBlockage = match serde_json::from_str(body) {
        Ok(report) => report,
        Err(err) => return HandlerResponse::error(400, "Invalid request body", Some(err.to_string())),
    };
    let blockage = match report.into_blockage(now) {
        Ok(blockage) => blockage,
        Err(StoreError::Invalid(details)) => return HandlerResponse::error(400, &details, None),
        Err(err) => return HandlerResponse::error(400, "Invalid blockage", Some(err.to_string())),
    };

    match store.put(blockage.clone()) {
        Ok(()) => {
            info!(id = %blockage.id, blockage = %blockage.label(), "blockage added");
            HandlerResponse::new(
                201,
                &AddBlockageResponse {
                    message: "Road blockage added successfully",
                    blockage,
                },
            )
        }
        Err(err) => {
            error!(%err, "failed to add blockage");
            HandlerResponse::error(500, "Failed to add road blockage", Some(err.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
struct ListBlockagesResponse {
    count: usize,
    blockages: Vec<Blockage>,
}

/// Lists blockages. Expired blockages are always excluded; inactive ones
/// unless `active_only` is false.
pub fn list_blockages<S: BlockageStore + ?Sized>(store: &S, active_only: bool, now: DateTime<Utc>) -> HandlerResponse {
    match store.scan() {
        Ok(all) => {
            let blockages: Vec<_> = all
                .into_iter()
                .filter(|b| !active_only || b.active)
                .filter(|b| !b.is_expired(now))
                .collect();
            HandlerResponse::new(
                200,
                &ListBlockagesResponse {
                    count: blockages.len(),
                    blockages,
                },
            )
        }
        Err(err) => {
            error!(%err, "failed to list blockages");
            HandlerResponse::error(500, "Failed to retrieve road blockages", Some(err.to_string()))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBlockageResponse {
    message: &'static str,
    blockage_id: String,
}

/// Hard-deletes a blockage. Deleting an unknown id succeeds.
pub fn delete_blockage<S: BlockageStore + ?Sized>(store: &S, id: Option<&str>) -> HandlerResponse {
    let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
        return HandlerResponse::error(400, "Missing blockageId in path parameters", None);
    };

    match store.delete(id) {
        Ok(existed) => {
            info!(id, existed, "blockage deleted");
            HandlerResponse::new(
                200,
                &DeleteBlockageResponse {
                    message: "Road blockage deleted successfully",
                    blockage_id: id.to_string(),
                },
            )
        }
        Err(err) => {
            error!(%err, "failed to delete blockage");
            HandlerResponse::error(500, "Failed to delete road blockage", Some(err.to_string()))
        }
    }
}
