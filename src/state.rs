use crate::{
    config::Config,
    services::{
        auth_service::BCRYPT_COST, BrasilApiHolidays, HolidayCalendar, JwtService, MlClient, OrsClient,
        SimulationService, UserStore,
    },
};
use std::sync::Arc;

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub jwt: JwtService,
    pub simulation: SimulationService,
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Wires the real upstream clients from configuration.
    pub fn from_config(config: &Config, users: Arc<dyn UserStore>) -> Result<Self, String> {
        let upstream = &config.upstream;
        let http = reqwest::Client::builder()
            .user_agent(concat!("triap-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let routing = OrsClient::new(http.clone(), &upstream.ors_base_url, &upstream.ors_api_key, upstream.ors_timeout);
        let predictor = MlClient::new(http.clone(), &upstream.ml_service_url, upstream.ml_timeout);
        let holidays = BrasilApiHolidays::new(http, &upstream.holiday_api_base, upstream.holiday_timeout);

        Ok(Self {
            users,
            jwt: JwtService::new(config.jwt.clone()),
            simulation: SimulationService {
                routing: Arc::new(routing),
                predictor: Arc::new(predictor),
                holidays: Arc::new(HolidayCalendar::new(Arc::new(holidays))),
                feature_set: upstream.ml_feature_set,
                holiday_strict: upstream.holiday_strict,
            },
            bcrypt_cost: BCRYPT_COST,
        })
    }
}
