pub mod auth;
pub mod health;
pub mod simulation;
pub mod swagger;

use crate::{middleware::AuthMiddleware, services::JwtService, utils::AppError};
use actix_web::{error::InternalError, web, ResponseError};

/// Malformed JSON bodies get the same `{success, error}` shape as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, req| {
            log::warn!("❌ Rejected body on {}: {}", req.path(), err);
            let response = AppError::Validation("Invalid request body".to_string()).error_response();
            InternalError::from_response(err, response).into()
        })
}

/// Same for path segments that don't parse, e.g. `/api/holidays/abc`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        log::warn!("❌ Rejected path {}: {}", req.path(), err);
        let response = AppError::Validation("Invalid path parameter".to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}

/// Route table shared by `main` and the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig, jwt: JwtService) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .app_data(json_config())
                .app_data(path_config())
                .route("/ping", web::get().to(health::ping))
                // Auth
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/protected")
                        .wrap(AuthMiddleware::new(jwt.clone()))
                        .route(web::get().to(auth::protected)),
                )
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware::new(jwt))
                        .route(web::get().to(auth::get_me)),
                )
                // Simulation (public)
                .route("/simulate", web::post().to(simulation::simulate))
                .route("/route", web::post().to(simulation::route))
                .route("/holidays/{year}", web::get().to(simulation::get_holidays)),
        );
}
