use crate::{
    models::{GeoPoint, RouteSummary},
    utils::polyline,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const DIRECTIONS_PATH: &str = "/v2/directions/driving-car";

/// Driving distance/duration between two points.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<RouteSummary, String>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    summary: DirectionsSummary,
    #[serde(default)]
    geometry: Option<String>,
}

// ORS omits both fields when origin == destination
#[derive(Debug, Deserialize)]
struct DirectionsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

/// openrouteservice directions client. The API key never leaves the server.
pub struct OrsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OrsClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// `[[lon, lat], [lon, lat]]`, the coordinate order ORS expects.
    pub fn directions_body(origin: GeoPoint, destination: GeoPoint) -> serde_json::Value {
        serde_json::json!({
            "coordinates": [
                [origin.lon, origin.lat],
                [destination.lon, destination.lat]
            ]
        })
    }
}

#[async_trait]
impl RoutingProvider for OrsClient {
    async fn route(&self, origin: GeoPoint, destination: GeoPoint) -> Result<RouteSummary, String> {
        log::info!(
            "🗺️  Requesting ORS route ({:.5},{:.5}) -> ({:.5},{:.5})",
            origin.lat, origin.lon, destination.lat, destination.lon
        );

        let url = format!("{}{}", self.base_url, DIRECTIONS_PATH);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .header("Accept", "application/json")
            .json(&Self::directions_body(origin, destination))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Failed to call ORS: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("ORS API error: {} {}", status, body));
        }

        let data: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse ORS response: {}", e))?;

        let route = data
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| "ORS returned no routes".to_string())?;

        let geometry = route.geometry.and_then(|encoded| {
            match polyline::decode(&encoded, polyline::ORS_PRECISION) {
                Ok(points) => Some(points),
                Err(e) => {
                    log::warn!("⚠️  Dropping undecodable ORS geometry: {}", e);
                    None
                }
            }
        });

        log::info!(
            "✅ ORS route: {:.0} m, {:.0} s",
            route.summary.distance, route.summary.duration
        );

        Ok(RouteSummary {
            distance_m: route.summary.distance,
            duration_s: route.summary.duration,
            geometry,
        })
    }
}
