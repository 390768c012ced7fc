// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret used to sign and verify tokens | Required |
//! | `TOKEN_TTL_SECS` | Validity window of issued tokens | `86400` |
//! | `REVOCATION_SWEEP_SECS` | Interval between revocation purges | `300` |
//! | `HOST` | Server bind IP address (IPv4 or IPv6) | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `SEED_ADMIN_NICK` | Bootstrap admin account nick | Unset |
//! | `SEED_ADMIN_PASSWORD` | Bootstrap admin account password | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::codec::DEFAULT_TOKEN_TTL;
use crate::auth::revocation::DEFAULT_SWEEP_INTERVAL;

/// Environment variable holding the token signing secret. No default;
/// startup fails without it.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const REVOCATION_SWEEP_ENV: &str = "REVOCATION_SWEEP_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const SEED_ADMIN_NICK_ENV: &str = "SEED_ADMIN_NICK";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Minimum secret length for HS256 (one SHA-256 block of key material).
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub nick: String,
    pub password: String,
}

/// Fully resolved process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub sweep_interval: Duration,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .field("bind_addr", &self.bind_addr)
            .field("tls", &self.tls)
            .field("seed_admin", &self.seed_admin.as_ref().map(|s| &s.nick))
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let token_ttl = parse_secs(&lookup, TOKEN_TTL_ENV)?.unwrap_or(DEFAULT_TOKEN_TTL);
        if token_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        // Expiry is an i64 Unix timestamp.
        if i64::try_from(token_ttl.as_secs()).is_err() {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                reason: format!("must not exceed {}", i64::MAX),
            });
        }
        let sweep_interval =
            parse_secs(&lookup, REVOCATION_SWEEP_ENV)?.unwrap_or(DEFAULT_SWEEP_INTERVAL);
        if sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: REVOCATION_SWEEP_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let ip: IpAddr = host
            .trim_matches(|c| c == '[' || c == ']')
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;
        let bind_addr = SocketAddr::new(ip, port);

        let tls = match (lookup(TLS_CERT_ENV), lookup(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_ENV)),
        };

        let seed_admin = match (lookup(SEED_ADMIN_NICK_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(nick), Some(password)) => Some(SeedAdmin { nick, password }),
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            _ => None,
        };

        Ok(Self {
            jwt_secret: jwt_secret.into_bytes(),
            token_ttl,
            sweep_interval,
            bind_addr,
            tls,
            seed_admin,
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
        })
    }
}

fn parse_secs<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    name,
                    reason: e.to_string(),
                })
        })
        .transpose()
}
