use crate::{
    models::{GeoPoint, RouteRequest, RouteSummary, SimulateRequest, SimulationResponse},
    services::{holiday_service::HolidayCalendar, prediction_service::PricePredictor, routing_service::RoutingProvider},
    utils::{
        features::{self, FeatureSet, TimeFeatures, TripFeatures},
        validation, AppError,
    },
};
use std::sync::Arc;

pub const ROUTE_FAILED: &str = "Failed to get route data (ORS)";
pub const PRICE_FAILED: &str = "Failed to compute price (ML)";
pub const HOLIDAY_FAILED: &str = "Failed to get holiday data";
pub const INVALID_FEATURES: &str = "Invalid data for the ML model";

/// Everything a price simulation talks to.
#[derive(Clone)]
pub struct SimulationService {
    pub routing: Arc<dyn RoutingProvider>,
    pub predictor: Arc<dyn PricePredictor>,
    pub holidays: Arc<HolidayCalendar>,
    pub feature_set: FeatureSet,
    /// Abort on holiday API failures instead of assuming a regular day
    pub holiday_strict: bool,
}

fn validate_point(point: Option<GeoPoint>, label: &str) -> Result<GeoPoint, AppError> {
    let point = point.ok_or_else(|| AppError::Validation(format!("{} is required (lat/lon)", label)))?;
    if !validation::is_valid_latitude(point.lat) || !validation::is_valid_longitude(point.lon) {
        return Err(AppError::Validation(format!("{} has invalid coordinates", label)));
    }
    Ok(point)
}

impl SimulationService {
    /// Validate → route → time features → ML.
    pub async fn simulate(&self, request: &SimulateRequest) -> Result<SimulationResponse, AppError> {
        let origin = validate_point(request.origin, "Origin")?;
        let destination = validate_point(request.destination, "Destination")?;
        let departure = request
            .datetime
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Departure datetime is required".to_string()))?;
        let departure = features::parse_departure(departure)
            .ok_or_else(|| AppError::Validation("Invalid departure datetime".to_string()))?;

        let route = self.route_between(origin, destination).await?;

        let time = TimeFeatures::from_datetime(&departure);
        let is_holiday = self.is_holiday(&time).await?;

        let payload = TripFeatures::build(self.feature_set, &time, is_holiday, route.distance_m, route.duration_s);
        if !payload.is_valid() {
            log::error!("❌ Refusing to send invalid features to ML: {:?}", payload);
            return Err(AppError::Internal(INVALID_FEATURES.to_string()));
        }

        let estimate = self.predictor.predict(&payload).await.map_err(|e| {
            log::error!("❌ ML call failed: {}", e);
            AppError::Upstream(PRICE_FAILED.to_string())
        })?;

        Ok(SimulationResponse::new(route, is_holiday, estimate))
    }

    /// Routing only, for the map preview.
    pub async fn route(&self, request: &RouteRequest) -> Result<RouteSummary, AppError> {
        let origin = validate_point(request.origin, "Origin")?;
        let destination = validate_point(request.destination, "Destination")?;
        self.route_between(origin, destination).await
    }

    async fn route_between(&self, origin: GeoPoint, destination: GeoPoint) -> Result<RouteSummary, AppError> {
        let route = self.routing.route(origin, destination).await.map_err(|e| {
            log::error!("❌ ORS call failed: {}", e);
            AppError::Upstream(ROUTE_FAILED.to_string())
        })?;

        if !route.distance_m.is_finite() || !route.duration_s.is_finite() {
            log::error!("❌ ORS returned non-numeric summary: {:?}", route);
            return Err(AppError::Upstream(ROUTE_FAILED.to_string()));
        }

        Ok(route)
    }

    async fn is_holiday(&self, time: &TimeFeatures) -> Result<bool, AppError> {
        if !self.feature_set.needs_holiday() {
            return Ok(false);
        }

        let date = time
            .date()
            .ok_or_else(|| AppError::Internal(INVALID_FEATURES.to_string()))?;

        match self.holidays.is_holiday(date).await {
            Ok(flag) => Ok(flag),
            Err(e) if self.holiday_strict => {
                log::error!("❌ Holiday lookup failed: {}", e);
                Err(AppError::Upstream(HOLIDAY_FAILED.to_string()))
            }
            Err(e) => {
                log::warn!("⚠️  Holiday lookup failed, assuming a regular day: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::PriceEstimate;
    use crate::services::holiday_service::tests::FakeHolidays;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub struct FakeRouting {
        pub fail: bool,
    }

    #[async_trait]
    impl RoutingProvider for FakeRouting {
        async fn route(&self, _origin: GeoPoint, _destination: GeoPoint) -> Result<RouteSummary, String> {
            if self.fail {
                return Err("connection timed out".to_string());
            }
            Ok(RouteSummary {
                distance_m: 5000.0,
                duration_s: 600.0,
                geometry: Some(vec![[-23.55, -46.63], [-23.56, -46.65]]),
            })
        }
    }

    /// Records every payload and answers with a fixed estimate.
    pub struct FakePredictor {
        pub fail: bool,
        pub seen: Mutex<Vec<serde_json::Value>>,
    }

    impl FakePredictor {
        pub fn new(fail: bool) -> Self {
            Self { fail, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PricePredictor for FakePredictor {
        async fn predict(&self, features: &TripFeatures) -> Result<PriceEstimate, String> {
            self.seen.lock().unwrap().push(serde_json::to_value(features).unwrap());
            if self.fail {
                return Err("503 Service Unavailable".to_string());
            }
            Ok(PriceEstimate::Single { price: 27.9 })
        }
    }

    pub fn service(
        routing_fails: bool,
        predictor: Arc<FakePredictor>,
        holidays: FakeHolidays,
        feature_set: FeatureSet,
        holiday_strict: bool,
    ) -> SimulationService {
        SimulationService {
            routing: Arc::new(FakeRouting { fail: routing_fails }),
            predictor,
            holidays: Arc::new(HolidayCalendar::new(Arc::new(holidays))),
            feature_set,
            holiday_strict,
        }
    }

    fn request(datetime: &str) -> SimulateRequest {
        serde_json::from_value(serde_json::json!({
            "origin": { "lat": -23.5505, "lon": -46.6333 },
            "destination": { "lat": -23.5614, "lon": -46.6559 },
            "datetime": datetime
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_simulate_sends_full_features() {
        let predictor = Arc::new(FakePredictor::new(false));
        let svc = service(false, predictor.clone(), FakeHolidays::new(), FeatureSet::Full, false);

        let response = svc.simulate(&request("2025-12-25T08:00")).await.unwrap();
        assert_eq!(response.price, Some(27.9));
        assert_eq!(response.distance_m, 5000.0);
        assert!(response.is_holiday);
        assert_eq!(response.route.as_ref().map(|r| r.len()), Some(2));

        let seen = predictor.seen.lock().unwrap();
        let payload = seen[0].as_object().unwrap();
        assert_eq!(payload.len(), 12);
        assert_eq!(payload["distancia_m"], 5000.0);
        assert_eq!(payload["tempo_estim_segundos"], 600.0);
        assert_eq!(payload["is_holiday"], 1);
        assert_eq!(payload["hour_min"], 8.0);
        assert_eq!(payload["weekday_val"], 4);
    }

    #[tokio::test]
    async fn test_simulate_basic_features_skip_holidays() {
        let predictor = Arc::new(FakePredictor::new(false));
        let holidays = FakeHolidays::failing();
        let svc = service(false, predictor.clone(), holidays, FeatureSet::Basic, true);

        svc.simulate(&request("2025-12-25T08:00")).await.unwrap();
        let seen = predictor.seen.lock().unwrap();
        assert_eq!(seen[0], serde_json::json!({ "distance_m": 5000.0, "duration_s": 600.0 }));
    }

    #[tokio::test]
    async fn test_simulate_raw_features_for_fastapi_model() {
        let predictor = Arc::new(FakePredictor::new(false));
        let svc = service(false, predictor.clone(), FakeHolidays::failing(), FeatureSet::Raw, true);

        let response = svc.simulate(&request("2025-12-25T08:00")).await.unwrap();
        assert!(!response.is_holiday);

        let seen = predictor.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            serde_json::json!({
                "hour_val": 8.0,
                "weekday_val": 4,
                "distance_m": 5000.0,
                "duration_s": 600.0,
                "day": 25,
                "month": 12,
                "year": 2025
            })
        );
    }

    #[tokio::test]
    async fn test_simulate_validation() {
        let svc = service(false, Arc::new(FakePredictor::new(false)), FakeHolidays::new(), FeatureSet::Full, false);

        let missing: SimulateRequest = serde_json::from_value(serde_json::json!({
            "destination": { "lat": -23.5, "lon": -46.6 },
            "datetime": "2025-05-10T10:00"
        }))
        .unwrap();
        assert_eq!(
            svc.simulate(&missing).await.unwrap_err(),
            AppError::Validation("Origin is required (lat/lon)".to_string())
        );

        let out_of_range: SimulateRequest = serde_json::from_value(serde_json::json!({
            "origin": { "lat": -123.5, "lon": -46.6 },
            "destination": { "lat": -23.5, "lon": -46.6 },
            "datetime": "2025-05-10T10:00"
        }))
        .unwrap();
        assert!(matches!(svc.simulate(&out_of_range).await, Err(AppError::Validation(_))));

        assert_eq!(
            svc.simulate(&request("next friday")).await.unwrap_err(),
            AppError::Validation("Invalid departure datetime".to_string())
        );
        assert!(matches!(svc.simulate(&request("")).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upstream_failures_abort() {
        let predictor = Arc::new(FakePredictor::new(false));
        let svc = service(true, predictor.clone(), FakeHolidays::new(), FeatureSet::Full, false);
        assert_eq!(
            svc.simulate(&request("2025-05-10T10:00")).await.unwrap_err(),
            AppError::Upstream(ROUTE_FAILED.to_string())
        );
        // ML never called after a routing failure
        assert!(predictor.seen.lock().unwrap().is_empty());

        let svc = service(false, Arc::new(FakePredictor::new(true)), FakeHolidays::new(), FeatureSet::Full, false);
        assert_eq!(
            svc.simulate(&request("2025-05-10T10:00")).await.unwrap_err(),
            AppError::Upstream(PRICE_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn test_holiday_failure_policy() {
        let predictor = Arc::new(FakePredictor::new(false));
        let lenient = service(false, predictor.clone(), FakeHolidays::failing(), FeatureSet::Full, false);
        let response = lenient.simulate(&request("2025-12-25T08:00")).await.unwrap();
        assert!(!response.is_holiday);

        let strict = service(false, predictor, FakeHolidays::failing(), FeatureSet::Full, true);
        assert_eq!(
            strict.simulate(&request("2025-12-25T08:00")).await.unwrap_err(),
            AppError::Upstream(HOLIDAY_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn test_route_only() {
        let svc = service(false, Arc::new(FakePredictor::new(false)), FakeHolidays::new(), FeatureSet::Full, false);
        let request: RouteRequest = serde_json::from_value(serde_json::json!({
            "origin": { "lat": -23.5505, "lon": -46.6333 },
            "destination": { "lat": -23.5614, "lon": -46.6559 }
        }))
        .unwrap();

        let route = svc.route(&request).await.unwrap();
        assert_eq!(route.duration_s, 600.0);
    }
}
