//! Configuration management
//!
//! Loads and validates process configuration from environment variables.
//! Everything here is read once at startup; the auth subsystem only ever
//! sees the immutable [`AuthSettings`] produced from it.

use chrono::Duration;
use std::env;
use thiserror::Error;

use crate::auth::AuthSettings;

const DEV_JWT_SECRET: &str = "development-secret-change-in-production";

/// Upper bound for every token lifetime setting (10 years)
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Database connection URL; the in-memory user store is used when absent
    pub database_url: Option<String>,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Issuer and audience of every access token
    pub domain: String,

    /// Shared HMAC signing secret
    pub jwt_secret: String,

    /// Access token TTL in seconds (default: 900 = 15 minutes)
    pub access_token_ttl_seconds: i64,

    /// Refresh token TTL in seconds (default: 86400 = 24 hours)
    pub refresh_token_ttl_seconds: i64,

    /// Remaining refresh-token lifetime at or below which a refresh is allowed
    pub refresh_window_seconds: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8090".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment.is_production() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .unwrap_or(5);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let domain = env::var("DOMAIN").unwrap_or_else(|_| "example.com".to_string());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment.is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()))
            }
            Err(_) => DEV_JWT_SECRET.to_string(),
        };

        let access_token_ttl_seconds = parse_seconds("ACCESS_TOKEN_TTL_SECONDS", 900)?;
        let refresh_token_ttl_seconds = parse_seconds("REFRESH_TOKEN_TTL_SECONDS", 86_400)?;
        let refresh_window_seconds = parse_seconds("REFRESH_WINDOW_SECONDS", 30)?;

        let config = Config {
            environment,
            port,
            database_url,
            db_max_connections,
            log_level,
            domain,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            refresh_window_seconds,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check the token lifetime invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET must not be empty".to_string(),
            ));
        }
        if self.domain.is_empty() {
            return Err(ConfigError::InvalidValue(
                "DOMAIN must not be empty".to_string(),
            ));
        }
        if self.access_token_ttl_seconds <= 0 || self.refresh_token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(
                "token TTLs must be positive".to_string(),
            ));
        }
        if self.access_token_ttl_seconds > MAX_TTL_SECONDS
            || self.refresh_token_ttl_seconds > MAX_TTL_SECONDS
            || self.refresh_window_seconds > MAX_TTL_SECONDS
        {
            return Err(ConfigError::InvalidValue(format!(
                "token TTLs and refresh window must not exceed {}s",
                MAX_TTL_SECONDS
            )));
        }
        if self.access_token_ttl_seconds >= self.refresh_token_ttl_seconds {
            return Err(ConfigError::InvalidValue(format!(
                "access token TTL ({}s) must be shorter than refresh token TTL ({}s)",
                self.access_token_ttl_seconds, self.refresh_token_ttl_seconds
            )));
        }
        if self.refresh_window_seconds < 0 {
            return Err(ConfigError::InvalidValue(
                "REFRESH_WINDOW_SECONDS must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings handed to the token issuer, verifier and refresh flow
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            domain: self.domain.clone(),
            secret: self.jwt_secret.clone(),
            access_ttl: Duration::seconds(self.access_token_ttl_seconds),
            refresh_ttl: Duration::seconds(self.refresh_token_ttl_seconds),
            refresh_window: Duration::seconds(self.refresh_window_seconds),
        }
    }

    /// Database URL with the password masked, for logging
    pub fn database_url_masked(&self) -> Option<String> {
        self.database_url.as_deref().map(mask_password)
    }
}

fn parse_seconds(var: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue(format!("{} must be a number of seconds", var))),
        Err(_) => Ok(default),
    }
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let prefix = &url[..colon_pos + 1];
            let suffix = &url[at_pos..];
            return format!("{}****{}", prefix, suffix);
        }
    }
    url.to_string()
}
