// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into an [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `quill.redb` | `./data` |
//! | `STORAGE_BACKEND` | `redb` or `memory` | `redb` |
//! | `JWT_SECRET` | HMAC token signing secret (at least 32 bytes) | Required |
//! | `TOKEN_TTL_SECS` | Issued token lifetime in seconds | `86400` |
//! | `TLS_CERT_PATH` | PEM certificate chain; HTTPS when set with the key | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::token::{TokenConfig, DEFAULT_TOKEN_TTL, MIN_SECRET_LENGTH};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// # Default
/// `./data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

/// Environment variable name for the token signing secret.
///
/// Never logged. Must be at least [`MIN_SECRET_LENGTH`] bytes.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the redb database inside the data directory.
pub const DATABASE_FILE: &str = "quill.redb";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{name} must be at least {min} bytes (got {0})", name = JWT_SECRET_ENV, min = MIN_SECRET_LENGTH)]
    SecretTooShort(usize),

    #[error("{cert} and {key} must be set together", cert = TLS_CERT_PATH_ENV, key = TLS_KEY_PATH_ENV)]
    IncompleteTls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Redb,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Redb => write!(f, "redb"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully parsed process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub token: TokenConfig,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(get(HOST_ENV), HOST_ENV, DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, Some(DEFAULT_PORT))?;

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let storage_backend = match get(STORAGE_BACKEND_ENV).as_deref().map(str::trim) {
            None => StorageBackend::default(),
            Some(v) if v.eq_ignore_ascii_case("redb") => StorageBackend::Redb,
            Some(v) if v.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: STORAGE_BACKEND_ENV,
                    reason: format!("expected `redb` or `memory`, got `{other}`"),
                })
            }
        };

        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort(secret.len()));
        }

        let ttl_secs: u64 = parse_or(
            get(TOKEN_TTL_ENV),
            TOKEN_TTL_ENV,
            Some(DEFAULT_TOKEN_TTL.as_secs()),
        )?;
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                reason: "must be greater than zero".into(),
            });
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir,
            storage_backend,
            token: TokenConfig::new(secret.into_bytes()).with_ttl(Duration::from_secs(ttl_secs)),
            tls,
            log_format,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
