use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Triap Service API",
        version = "1.0.0",
        description = "Backend of the Triap ride price comparison app.\n\n**Authentication:** `/api/protected` and `/api/me` require a JWT Bearer token obtained from `/api/login`.\n\n**Features:**\n- User registration and login\n- Ride price simulation (ORS routing + ML prediction)\n- Routing proxy for map previews\n- Public holiday lookup"
    ),
    paths(
        // Health
        crate::api::health::health_check,
        crate::api::health::ping,

        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::protected,
        crate::api::auth::get_me,

        // Simulation
        crate::api::simulation::simulate,
        crate::api::simulation::route,
        crate::api::simulation::get_holidays,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::Claims,
            crate::models::UserProfile,
            crate::models::GeoPoint,
            crate::models::SimulateRequest,
            crate::models::RouteRequest,
            crate::models::RouteSummary,
            crate::models::SimulationResponse,
            crate::models::Holiday,
        )
    ),
    tags(
        (name = "Health", description = "Health check and connectivity probe."),
        (name = "Auth", description = "Registration, login and token-protected user endpoints."),
        (name = "Simulation", description = "Ride price simulation, routing proxy and holiday data."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/login"))
                        .build(),
                ),
            );
        }
    }
}
