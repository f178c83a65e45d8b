//! Road blockage records.
//!
//! A blockage is a reported obstruction modelled as a circle: a WGS84 center
//! and a radius in meters. Records are owned by the blockage store; the
//! planner only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Radius used when a report does not specify one.
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;

pub const DEFAULT_DESCRIPTION: &str = "Road blockage reported";

pub const DEFAULT_REPORTER: &str = "web-ui";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blockage {
    #[serde(rename = "blockageId")]
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters.
    pub radius: f64,
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(rename = "isActive")]
    pub active: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_reporter")]
    pub reported_by: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_reporter() -> String {
    DEFAULT_REPORTER.to_string()
}

impl Blockage {
    /// Center as (lat, lng).
    pub fn center(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// True once `expires_at` has passed. Blockages without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Active and not expired: the set routing must avoid.
    pub fn is_in_effect(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired(now)
    }

    /// Short label used in logs and user-facing messages.
    pub fn label(&self) -> String {
        format!("{} ({}m radius)", self.description, self.radius)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_center(self.latitude, self.longitude)?;
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(StoreError::Invalid(format!(
                "radius must be a positive number of meters, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// A blockage report as submitted by a client, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlockage {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub reported_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewBlockage {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn radius(mut self, meters: f64) -> Self {
        self.radius = Some(meters);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Applies defaults, assigns a fresh id and validates the result.
    pub fn into_blockage(self, now: DateTime<Utc>) -> Result<Blockage, StoreError> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(StoreError::Invalid(
                "Missing required fields: latitude and longitude are required".to_string(),
            ));
        };

        let blockage = Blockage {
            id: Uuid::new_v4().to_string(),
            latitude,
            longitude,
            radius: self.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            description: self
                .description
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            severity: self.severity.unwrap_or_default(),
            active: true,
            timestamp: now,
            reported_by: self.reported_by.unwrap_or_else(default_reporter),
            expires_at: self.expires_at,
        };
        blockage.validate()?;
        Ok(blockage)
    }
}

/// Checks a (lat, lng) pair lies within WGS84 bounds.
pub fn validate_center(latitude: f64, longitude: f64) -> Result<(), StoreError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(StoreError::Invalid(format!(
            "latitude must be within [-90, 90], got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(StoreError::Invalid(format!(
            "longitude must be within [-180, 180], got {longitude}"
        )));
    }
    Ok(())
}
