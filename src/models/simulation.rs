use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// WGS84 point as sent by the web client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GeoPoint {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,
}

/// Accepts `-23.55` as well as `"-23.55"` (Nominatim returns strings).
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid coordinate: {}", value)))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SimulateRequest {
    pub origin: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
    /// Departure time, RFC 3339 or `YYYY-MM-DDTHH:MM`
    pub datetime: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RouteRequest {
    pub origin: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
}

/// Distance/duration of the fastest driving route.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
    /// Decoded geometry as `[lat, lon]` pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub geometry: Option<Vec<[f64; 2]>>,
}

/// Fare prediction, a single value or one per ride category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceEstimate {
    Single { price: f64 },
    Categories { prices: BTreeMap<String, f64> },
}

impl PriceEstimate {
    pub fn is_finite(&self) -> bool {
        match self {
            PriceEstimate::Single { price } => price.is_finite(),
            PriceEstimate::Categories { prices } => {
                !prices.is_empty() && prices.values().all(|p| p.is_finite())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SimulationResponse {
    pub success: bool,
    pub distance_m: f64,
    pub duration_s: f64,
    pub is_holiday: bool,
    /// Present when the model returns a single fare
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Present when the model returns fares per category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub route: Option<Vec<[f64; 2]>>,
}

impl SimulationResponse {
    pub fn new(route: RouteSummary, is_holiday: bool, estimate: PriceEstimate) -> Self {
        let (price, prices) = match estimate {
            PriceEstimate::Single { price } => (Some(price), None),
            PriceEstimate::Categories { prices } => (None, Some(prices)),
        };

        Self {
            success: true,
            distance_m: route.distance_m,
            duration_s: route.duration_s,
            is_holiday,
            price,
            prices,
            route: route.geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Holiday {
    pub date: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_accepts_numeric_strings() {
        let point: GeoPoint = serde_json::from_str(r#"{"lat": "-23.5505", "lon": " -46.6333 "}"#).unwrap();
        assert_eq!(point, GeoPoint { lat: -23.5505, lon: -46.6333 });

        let point: GeoPoint = serde_json::from_str(r#"{"lat": -23.5, "lon": -46}"#).unwrap();
        assert_eq!(point.lon, -46.0);

        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": "perto", "lon": -46.6}"#).is_err());
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": "NaN", "lon": -46.6}"#).is_err());
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": null, "lon": -46.6}"#).is_err());
    }

    #[test]
    fn test_response_with_single_price() {
        let route = RouteSummary { distance_m: 5000.0, duration_s: 600.0, geometry: None };
        let response = SimulationResponse::new(route, false, PriceEstimate::Single { price: 23.4 });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["price"], 23.4);
        assert!(json.get("prices").is_none());
        assert!(json.get("route").is_none());
    }

    #[test]
    fn test_response_with_categories() {
        let mut prices = BTreeMap::new();
        prices.insert("UberX".to_string(), 21.0);
        prices.insert("99Pop".to_string(), 19.5);
        let route = RouteSummary {
            distance_m: 5000.0,
            duration_s: 600.0,
            geometry: Some(vec![[-23.5, -46.6], [-23.6, -46.7]]),
        };
        let response = SimulationResponse::new(route, true, PriceEstimate::Categories { prices });
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("price").is_none());
        assert_eq!(json["prices"]["99Pop"], 19.5);
        assert_eq!(json["route"][1][0], -23.6);
        assert_eq!(json["is_holiday"], true);
    }

    #[test]
    fn test_price_estimate_finite() {
        assert!(PriceEstimate::Single { price: 10.0 }.is_finite());
        assert!(!PriceEstimate::Single { price: f64::INFINITY }.is_finite());
        assert!(!PriceEstimate::Categories { prices: BTreeMap::new() }.is_finite());
    }
}
