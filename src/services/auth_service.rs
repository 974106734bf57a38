use crate::{
    config::JwtConfig,
    models::{FavoriteApp, NewUser, User, UserProfile, UserType},
    services::user_store::{UserStore, EMAIL_TAKEN},
    utils::{validation, AppError},
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const BCRYPT_COST: u32 = 10;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_cellphone: Option<String>,
    pub user_password: Option<String>,
    /// `1` = 99, `2` = Uber (number or numeric string)
    #[schema(value_type = Option<i64>)]
    pub user_favorite_app: Option<serde_json::Value>,
    /// `1` = passenger, `2` = driver, `3` = company
    #[schema(value_type = Option<i64>)]
    pub user_is: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub user_email: Option<String>,
    pub user_password: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.clone(),
            email: user.email.clone(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(self.config.expiration_hours)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_ref()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.audience.clone()]);

        let mut issuers = HashSet::new();
        issuers.insert(self.config.issuer.clone());
        validation.iss = Some(issuers);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            log::debug!("Token rejected: {}", e);
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

pub async fn hash_password(plain: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(plain, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub async fn verify_password(plain: String, hashed: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(plain, &hashed))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

/// Accepts `2` as well as `"2"`, like the web form sends.
fn parse_int(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validates a registration, reporting the first failing field.
pub fn validate_registration(request: &RegisterRequest) -> Result<ValidRegistration, AppError> {
    let fail = |msg: &str| -> Result<ValidRegistration, AppError> {
        Err(AppError::Validation(msg.to_string()))
    };

    if validation::is_blank(request.user_name.as_deref()) {
        return fail("Name is required");
    }
    let email = request.user_email.as_deref().unwrap_or("");
    if !validation::is_valid_email(email) {
        return fail("A valid email is required");
    }
    if validation::is_blank(request.user_cellphone.as_deref()) {
        return fail("Cellphone is required");
    }
    let password = request.user_password.as_deref().unwrap_or("");
    if password.chars().count() < 6 {
        return fail("Password must be at least 6 characters");
    }
    let favorite_app = match parse_int(request.user_favorite_app.as_ref()).and_then(FavoriteApp::from_code) {
        Some(app) => app,
        None => return fail("Favorite app must be 1 (99) or 2 (Uber)"),
    };
    let user_type = match parse_int(request.user_is.as_ref()).and_then(UserType::from_code) {
        Some(t) => t,
        None => return fail("User type must be 1 (passenger), 2 (driver) or 3 (company)"),
    };

    Ok(ValidRegistration {
        name: request.user_name.as_deref().unwrap_or_default().trim().to_string(),
        email: email.trim().to_lowercase(),
        cellphone: request.user_cellphone.as_deref().unwrap_or_default().trim().to_string(),
        password: password.to_string(),
        favorite_app,
        user_type,
    })
}

#[derive(Debug)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub cellphone: String,
    pub password: String,
    pub favorite_app: FavoriteApp,
    pub user_type: UserType,
}

// User registration
pub async fn register(
    store: &dyn UserStore,
    request: &RegisterRequest,
    cost: u32,
) -> Result<RegisterResponse, AppError> {
    let valid = validate_registration(request)?;

    if store.find_by_email(&valid.email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(valid.password, cost).await?;

    let new_user = NewUser {
        name: valid.name,
        email: valid.email,
        cellphone: valid.cellphone,
        password_hash,
        favorite_app: valid.favorite_app,
        user_type: valid.user_type,
    };

    let user = store.insert(new_user.into_user(ObjectId::new().to_hex())).await?;
    log::info!("✅ User registered successfully: {}", user.email);

    Ok(RegisterResponse {
        success: true,
        message: "User registered successfully".to_string(),
        user_id: user.user_id,
    })
}

// User login
pub async fn login(
    store: &dyn UserStore,
    jwt: &JwtService,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let email = request.user_email.as_deref().unwrap_or("");
    if !validation::is_valid_email(email) {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    let password = match request.user_password.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(AppError::Validation("Password is required".to_string())),
    };

    let user = store
        .find_by_email(&email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt.generate(&user)?;

    Ok(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserProfile::from(&user),
    })
}

// Get current user
pub async fn get_current_user(
    store: &dyn UserStore,
    user_id: &str,
) -> Result<UserProfile, AppError> {
    store
        .find_by_id(user_id)
        .await?
        .map(|user| UserProfile::from(&user))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
