/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, REDIS_URL, JWT 鍵, token TTL など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub redis_url: String,

    pub cors_allowed_origins: Vec<String>,

    pub auth_issuer: String,
    pub jwt_private_key_pem: String,
    pub jwt_public_key_pem: String,
    // Token lifetimes (seconds); also the cache entry TTLs.
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
    pub auth_policy_path: Option<PathBuf>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material or connection strings
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("auth_issuer", &self.auth_issuer)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .finish_non_exhaustive()
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn pem(key: &'static str) -> Result<String, ConfigError> {
    Ok(required(key)?.replace("\\n", "\n"))
}

fn parsed_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Upper bound for both token TTLs (one year).
const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

fn check_token_ttls(access: u64, refresh: u64) -> Result<(), ConfigError> {
    if access == 0 || access > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
    }
    if refresh <= access || refresh > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed_or("PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = required("DATABASE_URL")?;
        let redis_url = required("REDIS_URL")?;

        let cors_allowed_origins =
            split_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let auth_issuer = required("AUTH_ISSUER")?;
        let jwt_private_key_pem = pem("JWT_PRIVATE_KEY_PEM")?;
        let jwt_public_key_pem = pem("JWT_PUBLIC_KEY_PEM")?;

        let access_token_ttl_seconds = parsed_or("ACCESS_TOKEN_TTL_SECONDS", 1800)?; // 30 min
        let refresh_token_ttl_seconds = parsed_or("REFRESH_TOKEN_TTL_SECONDS", 604_800)?; // 7 days
        check_token_ttls(access_token_ttl_seconds, refresh_token_ttl_seconds)?;
        let token_leeway_seconds = parsed_or("TOKEN_LEEWAY_SECONDS", 30)?;

        let auth_policy_path = env::var("AUTH_POLICY_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let request_timeout = Duration::from_secs(parsed_or("REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes = parsed_or("REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            redis_url,
            cors_allowed_origins,
            auth_issuer,
            jwt_private_key_pem,
            jwt_public_key_pem,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            token_leeway_seconds,
            auth_policy_path,
            request_timeout,
            request_body_limit_bytes,
        })
    }
}
