use crate::utils::features::FeatureSet;
use std::env;
use std::time::Duration;

const DEFAULT_JWT_SECRET: &str = "default-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStoreKind {
    MongoDB,
    Memory,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: i64,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub ors_api_key: String,
    pub ors_base_url: String,
    pub ors_timeout: Duration,
    pub ml_service_url: String,
    pub ml_timeout: Duration,
    pub ml_feature_set: FeatureSet,
    pub holiday_api_base: String,
    pub holiday_timeout: Duration,
    pub holiday_strict: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub user_store: UserStoreKind,
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Reads configuration from the process environment (call `dotenv()` first).
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secs = |key: &str, default: u64| -> Result<Duration, String> {
            let raw = get(key, &default.to_string());
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("{} must be a number of seconds, got '{}'", key, raw))
        };

        let port_raw = get("PORT", "3000");
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("PORT must be a valid port number, got '{}'", port_raw))?;

        let user_store = match get("USER_STORE", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => UserStoreKind::MongoDB,
            "memory" => UserStoreKind::Memory,
            other => return Err(format!("USER_STORE must be 'mongodb' or 'memory', got '{}'", other)),
        };

        let expiration_raw = get("JWT_EXPIRATION_HOURS", "2");
        let expiration_hours = expiration_raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| format!("JWT_EXPIRATION_HOURS must be a positive integer, got '{}'", expiration_raw))?;

        let feature_set_raw = get("ML_FEATURE_SET", "full");
        let ml_feature_set = FeatureSet::parse(&feature_set_raw)
            .ok_or_else(|| format!("ML_FEATURE_SET must be 'full', 'basic' or 'raw', got '{}'", feature_set_raw))?;

        let holiday_strict = matches!(
            get("HOLIDAY_STRICT", "false").trim().to_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let cors_origins = get("CORS_ORIGINS", "http://localhost:5173,http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port,
            database_url: get("DATABASE_URL", "mongodb://localhost:27017/triap"),
            user_store,
            cors_origins,
            jwt: JwtConfig {
                secret: get("JWT_SECRET", DEFAULT_JWT_SECRET),
                issuer: get("JWT_ISSUER", "triap-service"),
                audience: get("JWT_AUDIENCE", "triap-web"),
                expiration_hours,
            },
            upstream: UpstreamConfig {
                ors_api_key: get("ORS_API_KEY", ""),
                ors_base_url: get("ORS_BASE_URL", "https://api.openrouteservice.org")
                    .trim_end_matches('/')
                    .to_string(),
                ors_timeout: secs("ORS_TIMEOUT_SECS", 10)?,
                ml_service_url: get("ML_SERVICE_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
                ml_timeout: secs("ML_TIMEOUT_SECS", 15)?,
                ml_feature_set,
                holiday_api_base: get("HOLIDAY_API_BASE", "https://brasilapi.com.br/api/feriados/v1")
                    .trim_end_matches('/')
                    .to_string(),
                holiday_timeout: secs("HOLIDAY_TIMEOUT_SECS", 5)?,
                holiday_strict,
            },
        })
    }

    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt.secret == DEFAULT_JWT_SECRET
    }

    /// Logs what was loaded without printing secrets.
    pub fn log_summary(&self) {
        log::info!("🗄️  User store: {:?}", self.user_store);
        log::info!("🤖 ML Service URL: {} (features: {:?})", self.upstream.ml_service_url, self.upstream.ml_feature_set);
        log::info!("🗺️  ORS base URL: {}", self.upstream.ors_base_url);
        log::info!("🔑 ORS API key loaded: {}", if self.upstream.ors_api_key.is_empty() { "NO" } else { "yes" });
        log::info!("📅 Holiday API: {} (strict: {})", self.upstream.holiday_api_base, self.upstream.holiday_strict);

        if self.upstream.ors_api_key.is_empty() {
            log::warn!("⚠️  ORS_API_KEY is not set, route lookups will be rejected by ORS");
        }
        if self.uses_default_jwt_secret() {
            log::warn!("⚠️  JWT_SECRET is not set, using the insecure default secret");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.user_store, UserStoreKind::MongoDB);
        assert_eq!(config.jwt.expiration_hours, 2);
        assert_eq!(config.upstream.ors_timeout, Duration::from_secs(10));
        assert_eq!(config.upstream.ml_timeout, Duration::from_secs(15));
        assert_eq!(config.upstream.holiday_timeout, Duration::from_secs(5));
        assert_eq!(config.upstream.ml_feature_set, FeatureSet::Full);
        assert!(!config.upstream.holiday_strict);
        assert!(config.uses_default_jwt_secret());
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("PORT", "8080"),
            ("USER_STORE", "memory"),
            ("ML_SERVICE_URL", "http://ml:5000/"),
            ("ML_FEATURE_SET", "basic"),
            ("HOLIDAY_STRICT", "true"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.user_store, UserStoreKind::Memory);
        assert_eq!(config.upstream.ml_service_url, "http://ml:5000");
        assert_eq!(config.upstream.ml_feature_set, FeatureSet::Basic);
        assert!(config.upstream.holiday_strict);
        assert!(!config.uses_default_jwt_secret());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_with(&[("PORT", "abc")]).is_err());
        assert!(config_with(&[("USER_STORE", "sqlite")]).is_err());
        assert!(config_with(&[("JWT_EXPIRATION_HOURS", "0")]).is_err());
        assert!(config_with(&[("ML_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_with(&[("ML_FEATURE_SET", "xgboost")]).is_err());
    }

    #[test]
    fn test_raw_feature_set_for_fastapi_model() {
        let config = config_with(&[("ML_FEATURE_SET", "raw")]).unwrap();
        assert_eq!(config.upstream.ml_feature_set, FeatureSet::Raw);
    }
}
