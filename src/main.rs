mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{Config, UserStoreKind};
use dotenv::dotenv;
use services::{InMemoryUserStore, MongoUserStore, UserStore};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting Triap Service...");
    config.log_summary();

    let users: Arc<dyn UserStore> = match config.user_store {
        UserStoreKind::MongoDB => {
            let db = database::MongoDB::new(&config.database_url).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(MongoUserStore::new(db))
        }
        UserStoreKind::Memory => {
            log::warn!("⚠️  Using in-memory user store, accounts are lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let state = state::AppState::from_config(&config, users)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let state_data = web::Data::new(state);

    let host = config.host.clone();
    let port = config.port;
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();
        let jwt = state_data.jwt.clone();

        App::new()
            .app_data(state_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(move |cfg| api::configure(cfg, jwt))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
