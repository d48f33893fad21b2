// src/common/config.rs
//! Environment driven configuration

use chrono::Duration;
use std::env;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "replace_with_strong_secret";
const DEFAULT_SESSION_TTL: &str = "7d";
const DEFAULT_RESET_TTL: &str = "1h";

/// Longest accepted token lifetime (366 days)
const MAX_LIFETIME_SECS: i64 = 366 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub bootstrap_admin: Option<(String, String)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://agro.db".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_ttl: Duration::days(7),
            reset_ttl: Duration::hours(1),
            port: 8080,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        // JWT_SECRET - HS256 signing secret shared by session and reset tokens
        match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => warn!("JWT_SECRET not set, using an insecure development secret"),
        }

        // JWT_EXPIRES_IN - session token lifetime ("7d", "12h", "3600")
        let session = env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| DEFAULT_SESSION_TTL.into());
        match parse_lifetime(&session) {
            Some(ttl) => config.session_ttl = ttl,
            None => warn!(value = %session, "Invalid JWT_EXPIRES_IN, keeping default"),
        }

        // RESET_TOKEN_EXPIRES_IN - password reset token lifetime
        let reset = env::var("RESET_TOKEN_EXPIRES_IN").unwrap_or_else(|_| DEFAULT_RESET_TTL.into());
        match parse_lifetime(&reset) {
            Some(ttl) => config.reset_ttl = ttl,
            None => warn!(value = %reset, "Invalid RESET_TOKEN_EXPIRES_IN, keeping default"),
        }

        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            if !email.is_empty() && !password.is_empty() {
                config.bootstrap_admin = Some((email, password));
            }
        }

        config
    }
}

/// Parses a lifetime such as "7d", "1h", "30m", "45s" or a bare number of seconds.
/// Zero, negative and values above 366 days are rejected.
pub fn parse_lifetime(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], Some(c)),
        _ => (value, None),
    };

    let amount: i64 = digits.trim().parse().ok()?;
    if amount <= 0 {
        return None;
    }

    let unit_secs: i64 = match unit.map(|c| c.to_ascii_lowercase()) {
        None | Some('s') => 1,
        Some('m') => 60,
        Some('h') => 60 * 60,
        Some('d') => 24 * 60 * 60,
        Some(_) => return None,
    };

    let secs = amount.checked_mul(unit_secs)?;
    if secs > MAX_LIFETIME_SECS {
        return None;
    }
    Some(Duration::seconds(secs))
}
