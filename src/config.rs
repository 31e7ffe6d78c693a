// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`GatewayConfig`] they are loaded into. Configuration is read once at
//! startup and is immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC-SHA256 token signing secret | development secret |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime in seconds | `604800` (7 days) |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime in seconds | `2592000` (30 days) |
//! | `AUTH_ALLOW_LIST` | Comma-separated unauthenticated routes | see [`DEFAULT_ALLOW_LIST`] |
//! | `AUTH_USERS` | Comma-separated `username:password` pairs | `admin:password` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{collections::HashSet, env, fmt, net::SocketAddr, str::FromStr};

use chrono::Duration;

use crate::auth::allow_list::{AllowList, AllowListError};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const ALLOW_LIST_ENV: &str = "AUTH_ALLOW_LIST";
pub const USERS_ENV: &str = "AUTH_USERS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Access tokens live for 7 days.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Refresh tokens live for 30 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Upper bound on either token lifetime (100 years).
pub const MAX_TOKEN_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Routes reachable without a bearer token: login, the time echo, health
/// probes and the API docs. Pre-flight requests are always allowed on top
/// of this list.
pub const DEFAULT_ALLOW_LIST: &str = "/api/login, /time, /health/*, /docs/*, /api-doc/*";

pub const DEFAULT_USERS: &str = "admin:password";

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Signing secret used when `JWT_SECRET` is unset.
///
/// Only suitable for local development; `main` warns when it is in use.
pub const DEVELOPMENT_JWT_SECRET: &str = "relational-auth-gateway-development-secret-change-me";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is set but empty")]
    EmptySecret,

    #[error("invalid value for {var}: {value:?} (expected 1..=3153600000 seconds)")]
    InvalidTtl { var: &'static str, value: String },

    #[error("invalid value for PORT: {0:?}")]
    InvalidPort(String),

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("invalid value for LOG_FORMAT: {0:?} (expected `json` or `pretty`)")]
    InvalidLogFormat(String),

    #[error("invalid AUTH_USERS entry for user {0:?}: expected `username:password`")]
    InvalidUser(String),

    #[error("user {0:?} is listed more than once in AUTH_USERS")]
    DuplicateUser(String),

    #[error("invalid AUTH_ALLOW_LIST: {0}")]
    AllowList(#[from] AllowListError),
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Process-wide gateway configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub allow_list: AllowList,
    pub users: Vec<(String, String)>,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => {
                let parsed = raw.trim().parse::<u16>();
                parsed.map_err(|_| ConfigError::InvalidPort(raw))?
            }
            None => DEFAULT_PORT,
        };

        let jwt_secret = match lookup(JWT_SECRET_ENV) {
            Some(secret) if secret.is_empty() => return Err(ConfigError::EmptySecret),
            Some(secret) => secret,
            None => DEVELOPMENT_JWT_SECRET.to_string(),
        };

        let access_token_ttl = parse_ttl(
            ACCESS_TOKEN_TTL_ENV,
            lookup(ACCESS_TOKEN_TTL_ENV),
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
        )?;
        let refresh_token_ttl = parse_ttl(
            REFRESH_TOKEN_TTL_ENV,
            lookup(REFRESH_TOKEN_TTL_ENV),
            DEFAULT_REFRESH_TOKEN_TTL_SECS,
        )?;

        let allow_list = AllowList::parse(
            lookup(ALLOW_LIST_ENV)
                .as_deref()
                .unwrap_or(DEFAULT_ALLOW_LIST),
        )?;

        let users = parse_users(lookup(USERS_ENV).as_deref().unwrap_or(DEFAULT_USERS))?;

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            allow_list,
            users,
            log_format,
        })
    }

    /// Socket address the server should bind to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidBindAddress(raw))
    }

    /// True when no `JWT_SECRET` was supplied.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            allow_list: AllowList::default(),
            users: vec![("admin".to_string(), "password".to_string())],
            log_format: LogFormat::default(),
        }
    }
}

// Secrets and passwords stay out of debug output.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("allow_list", &self.allow_list)
            .field("users", &self.users.len())
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_ttl(var: &'static str, raw: Option<String>, default: i64) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::seconds(default));
    };

    let parsed = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_TOKEN_TTL_SECS).contains(secs))
        .and_then(Duration::try_seconds);
    parsed.ok_or(ConfigError::InvalidTtl { var, value: raw })
}

fn parse_users(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let mut seen = HashSet::new();
    let mut users = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (username, password) = match entry.split_once(':') {
            Some((u, p)) if !u.trim().is_empty() && !p.is_empty() => (u.trim(), p),
            Some((u, _)) => return Err(ConfigError::InvalidUser(u.trim().to_string())),
            None => return Err(ConfigError::InvalidUser(entry.to_string())),
        };

        if !seen.insert(username.to_string()) {
            return Err(ConfigError::DuplicateUser(username.to_string()));
        }
        users.push((username.to_string(), password.to_string()));
    }

    Ok(users)
}
