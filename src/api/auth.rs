use crate::{
    services::auth_service::{self, Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    state::AppState,
    utils::AppError,
};
use actix_web::{web, HttpResponse, ResponseError};

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid data or email already registered")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let email = request.user_email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /api/register - email: {}", email);

    match auth_service::register(state.users.as_ref(), &request, state.bcrypt_cost).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {} ({})", email, response.user_id);
            HttpResponse::Created().json(response)
        }
        Err(e @ (AppError::Database(_) | AppError::Internal(_))) => {
            log::error!("❌ Registration error: {} - {}", email, e);
            e.error_response()
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let email = request.user_email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /api/login - email: {}", email);

    match auth_service::login(state.users.as_ref(), &state.jwt, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email);
            HttpResponse::Ok().json(response)
        }
        Err(e @ (AppError::Database(_) | AppError::Internal(_))) => {
            log::error!("❌ Login error: {} - {}", email, e);
            e.error_response()
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/protected",
    tag = "Auth",
    responses(
        (status = 200, description = "Token accepted", body = Claims),
        (status = 401, description = "Missing, malformed or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn protected(claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("✓ GET /api/protected - user: {}", claims.sub);

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "msg": "You reached a protected route",
        "user": claims.into_inner()
    }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile of the logged-in user", body = crate::models::UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::info!("👤 GET /api/me - user: {}", claims.sub);

    match auth_service::get_current_user(state.users.as_ref(), &claims.sub).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user
        })),
        Err(e) => {
            log::warn!("❌ Failed to get user {}: {}", claims.sub, e);
            e.error_response()
        }
    }
}
