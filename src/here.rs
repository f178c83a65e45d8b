//! HERE Routing v8 HTTP adapter.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::request::RouteRequest;
use crate::traits::{ProviderRoute, ProviderRoutes, ProviderSection, RoutingProvider};

#[derive(Debug, Clone)]
pub struct HereConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for HereConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.hereapi.com".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HereClient {
    config: HereConfig,
    client: reqwest::blocking::Client,
}

impl HereClient {
    pub fn new(config: HereConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn routes_url(&self) -> String {
        format!("{}/v8/routes", self.config.base_url.trim_end_matches('/'))
    }
}

impl RoutingProvider for HereClient {
    fn request_route(&self, request: &RouteRequest) -> Result<ProviderRoutes, RouteError> {
        let url = self.routes_url();
        let query = request.query_pairs();
        debug!(%url, ?query, "requesting route");

        // Errors are stripped of their URL; it carries the API key.
        let response = self
            .client
            .get(&url)
            .query(&query)
            .query(&[("apiKey", self.config.api_key.as_str())])
            .send()
            .map_err(|err| RouteError::Network(err.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| RouteError::Network(err.without_url().to_string()))?;

        let routes = parse_response(status.as_u16(), &body)?;
        debug!(status = status.as_u16(), routes = routes.routes.len(), "provider responded");
        Ok(routes)
    }
}

/// Interprets a provider body.
///
/// An unparsable body is malformed whatever the status; a parsable body with
/// a non-2xx status or an `error` field is a provider error.
pub fn parse_response(status: u16, body: &str) -> Result<ProviderRoutes, RouteError> {
    let parsed: HereResponse = serde_json::from_str(body).map_err(|err| {
        warn!(status, "provider body is not valid JSON");
        RouteError::MalformedResponse(format!("failed to parse response: {err}"))
    })?;

    if !(200..300).contains(&status) {
        let message = parsed
            .error_message()
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(RouteError::Provider {
            status: Some(status),
            message,
        });
    }

    if parsed.error.is_some() {
        let message = parsed
            .error_message()
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(RouteError::Provider {
            status: None,
            message,
        });
    }

    Ok(parsed.into_routes())
}

#[derive(Debug, Deserialize)]
struct HereResponse {
    #[serde(default)]
    routes: Option<Vec<HereRoute>>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl HereResponse {
    fn error_message(&self) -> Option<String> {
        if let Some(description) = &self.error_description {
            return Some(description.clone());
        }
        match &self.error {
            Some(Value::String(text)) => return Some(text.clone()),
            Some(Value::Object(map)) => {
                if let Some(Value::String(text)) = map.get("message") {
                    return Some(text.clone());
                }
            }
            _ => {}
        }
        self.message.clone().or_else(|| self.title.clone())
    }

    fn into_routes(self) -> ProviderRoutes {
        let routes = self
            .routes
            .unwrap_or_default()
            .into_iter()
            .map(|route| ProviderRoute {
                sections: route
                    .sections
                    .into_iter()
                    .map(|section| ProviderSection {
                        length_meters: section.summary.as_ref().map(|s| s.length),
                        duration_seconds: section.summary.as_ref().map(|s| s.duration),
                        polyline: section.polyline,
                    })
                    .collect(),
            })
            .collect();
        ProviderRoutes { routes }
    }
}

#[derive(Debug, Deserialize)]
struct HereRoute {
    #[serde(default)]
    sections: Vec<HereSection>,
}

#[derive(Debug, Deserialize)]
struct HereSection {
    #[serde(default)]
    summary: Option<HereSummary>,
    #[serde(default)]
    polyline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HereSummary {
    length: f64,
    duration: f64,
}
