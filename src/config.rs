/*
 * Responsibility
 * - Load configuration from the environment (DATABASE_URL, JWT_SECRET, ...)
 * - Validate required values (fail the boot if missing)
 */
use std::net::SocketAddr;
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
        match env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
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

/// Outbound mail settings. Absent when `MAIL_API_KEY` is not set, in which
/// case confirmation mails are skipped with a log line.
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub redis_url: Option<String>,

    pub jwt_secret: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub email_token_ttl_seconds: u64,

    pub rate_limit_times: u64,
    pub rate_limit_window: Duration,

    pub cors_allowed_origins: Vec<String>,

    /// External base URL used in confirmation links.
    pub public_base_url: String,
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let access_token_ttl_seconds = env::var("ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(900); // 15 min
        let refresh_token_ttl_seconds = env::var("REFRESH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(604_800); // 7 days
        let email_token_ttl_seconds = env::var("EMAIL_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(604_800); // 7 days

        let rate_limit_times = env::var("RATE_LIMIT_TIMES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);
        let rate_limit_seconds: u64 = env::var("RATE_LIMIT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        validate_rate_limit(rate_limit_times, rate_limit_seconds)?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let mail = match env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty()) {
            Some(api_key) => Some(MailConfig {
                api_url: env::var("MAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
                api_key,
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "contacts <no-reply@localhost>".to_string()),
            }),
            None => None,
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            redis_url,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            email_token_ttl_seconds,
            rate_limit_times,
            rate_limit_window: Duration::from_secs(rate_limit_seconds),
            cors_allowed_origins,
            public_base_url,
            mail,
        })
    }
}

fn validate_rate_limit(times: u64, seconds: u64) -> Result<(), ConfigError> {
    if times == 0 {
        return Err(ConfigError::Invalid("RATE_LIMIT_TIMES"));
    }
    if seconds == 0 {
        return Err(ConfigError::Invalid("RATE_LIMIT_SECONDS"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_errors_name_the_offending_key() {
        assert!(matches!(
            validate_rate_limit(0, 60),
            Err(ConfigError::Invalid("RATE_LIMIT_TIMES"))
        ));
        assert!(matches!(
            validate_rate_limit(3, 0),
            Err(ConfigError::Invalid("RATE_LIMIT_SECONDS"))
        ));
        assert!(validate_rate_limit(3, 60).is_ok());
    }
}
