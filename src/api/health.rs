use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub user_store: &'static str,
    /// Years whose holidays are already in memory
    pub holiday_years_cached: Vec<i32>,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "triap-service",
        version: env!("CARGO_PKG_VERSION"),
        user_store: state.users.backend(),
        holiday_years_cached: state.simulation.holidays.cached_years(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Connectivity probe used by the web client.
#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Pong")
    )
)]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "pong": true }))
}
