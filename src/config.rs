use std::{env, net::SocketAddr};

use chrono::Duration;
use thiserror::Error;

use crate::utils::jwt::{validate_secret, JwtSecretError, DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_NAME: &str = "Admin User";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    JwtSecret(#[from] JwtSecretError),
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Account created or refreshed by `POST /api/seed`.
pub struct SeedAdmin {
    pub email: String,
    pub password: Option<String>,
    pub name: String,
}

pub struct Config {
    pub database_url: Option<String>,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub seed_secret: Option<String>,
    pub seed_admin: SeedAdmin,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(JwtSecretError::Missing)?;
        validate_secret(jwt_secret.as_bytes())?;

        let token_ttl = match var("JWT_EXPIRES_IN") {
            Some(raw) => parse_ttl(&raw).ok_or(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                value: raw,
                reason: "expected a positive duration up to 365d, such as 7d, 12h, 30m, 45s or 3600",
            })?,
            None => DEFAULT_TOKEN_TTL,
        };

        let bind_addr = {
            let raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
            raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: raw,
                reason: "expected host:port",
            })?
        };

        Ok(Config {
            database_url: var("DATABASE_URL"),
            frontend_origin: var("FRONTEND_ORIGIN")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string()),
            bind_addr,
            jwt_secret,
            token_ttl,
            seed_secret: var("SEED_SECRET"),
            seed_admin: SeedAdmin {
                email: var("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
                password: var("ADMIN_PASSWORD"),
                name: var("ADMIN_NAME").unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string()),
            },
        })
    }
}

/// Accepts `7d`, `12h`, `30m`, `45s`, or a bare number of seconds, no longer
/// than `MAX_TOKEN_TTL`.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (idx, c) if c.is_ascii_alphabetic() => (&raw[..idx], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };
    let amount: i64 = digits.parse().ok().filter(|n| *n > 0)?;

    let ttl = match unit {
        's' => Duration::try_seconds(amount),
        'm' => Duration::try_minutes(amount),
        'h' => Duration::try_hours(amount),
        'd' => Duration::try_days(amount),
        _ => None,
    }?;
    (ttl <= MAX_TOKEN_TTL).then_some(ttl)
}
