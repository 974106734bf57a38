use crate::{
    models::{RouteRequest, RouteSummary, SimulateRequest, SimulationResponse},
    services::simulation_service::HOLIDAY_FAILED,
    state::AppState,
    utils::AppError,
};
use actix_web::{web, HttpResponse, ResponseError};

#[utoipa::path(
    post,
    path = "/api/simulate",
    tag = "Simulation",
    request_body = SimulateRequest,
    responses(
        (status = 200, description = "Estimated fares for the trip", body = SimulationResponse),
        (status = 400, description = "Missing or invalid origin/destination/datetime"),
        (status = 500, description = "Routing or ML service failure")
    )
)]
pub async fn simulate(
    state: web::Data<AppState>,
    request: web::Json<SimulateRequest>,
) -> HttpResponse {
    log::info!("🚕 POST /api/simulate");

    match state.simulation.simulate(&request).await {
        Ok(response) => {
            log::info!(
                "✅ Simulation done: {:.0} m, {:.0} s",
                response.distance_m, response.duration_s
            );
            HttpResponse::Ok().json(response)
        }
        Err(e @ AppError::Validation(_)) => {
            log::warn!("❌ Simulation rejected: {}", e);
            e.error_response()
        }
        Err(e) => {
            log::error!("❌ Simulation failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/route",
    tag = "Simulation",
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Driving distance, duration and geometry", body = RouteSummary),
        (status = 400, description = "Missing or invalid coordinates"),
        (status = 500, description = "Routing failure")
    )
)]
pub async fn route(
    state: web::Data<AppState>,
    request: web::Json<RouteRequest>,
) -> HttpResponse {
    log::info!("🗺️  POST /api/route");

    match state.simulation.route(&request).await {
        Ok(route) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "distance_m": route.distance_m,
            "duration_s": route.duration_s,
            "route": route.geometry
        })),
        Err(e) => {
            log::warn!("❌ Route lookup failed: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/holidays/{year}",
    tag = "Simulation",
    params(
        ("year" = i32, Path, description = "Calendar year, e.g. 2025")
    ),
    responses(
        (status = 200, description = "`{success, year, holidays: [Holiday]}`"),
        (status = 400, description = "Year out of range"),
        (status = 500, description = "Holiday API failure")
    )
)]
pub async fn get_holidays(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let year = path.into_inner();
    log::info!("📅 GET /api/holidays/{}", year);

    if !(1900..=2199).contains(&year) {
        return AppError::Validation("Year must be between 1900 and 2199".to_string()).error_response();
    }

    match state.simulation.holidays.year(year).await {
        Ok(entry) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "year": year,
            "holidays": entry.holidays
        })),
        Err(e) => {
            log::error!("❌ Holiday lookup failed for {}: {}", year, e);
            AppError::Upstream(HOLIDAY_FAILED.to_string()).error_response()
        }
    }
}
