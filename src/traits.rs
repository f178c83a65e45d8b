//! Seams to the planner's external collaborators.
//!
//! The planner never talks to a database or an HTTP API directly; it is
//! handed implementations of these traits. Concrete apps plug in their own
//! store and provider, tests plug in scripted ones.

use chrono::{DateTime, Utc};

use crate::blockage::Blockage;
use crate::error::{RouteError, StoreError};
use crate::request::RouteRequest;

/// Persistent blockage storage, keyed by blockage id.
pub trait BlockageStore {
    /// Inserts or replaces a blockage.
    fn put(&self, blockage: Blockage) -> Result<(), StoreError>;

    /// Returns every stored blockage, active or not.
    fn scan(&self) -> Result<Vec<Blockage>, StoreError>;

    /// Removes a blockage. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Blockages that routing must avoid at `now`: active and not expired.
    fn active_blockages(&self, now: DateTime<Utc>) -> Result<Vec<Blockage>, StoreError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|blockage| blockage.is_in_effect(now))
            .collect())
    }
}

/// A third-party routing service.
///
/// Implementations issue exactly one request per call and never retry;
/// retry policy belongs to the caller.
pub trait RoutingProvider {
    fn request_route(&self, request: &RouteRequest) -> Result<ProviderRoutes, RouteError>;
}

/// Routes returned by a provider, best first. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderRoutes {
    pub routes: Vec<ProviderRoute>,
}

impl ProviderRoutes {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// One candidate route. Only the first section is used.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub sections: Vec<ProviderSection>,
}

/// A route section. Summary and polyline are optional on the wire and
/// checked by the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSection {
    /// Length in meters.
    pub length_meters: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub polyline: Option<String>,
}
