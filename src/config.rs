// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed configuration structs built from them. Configuration is loaded from
//! the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Relay bind address | `0.0.0.0` |
//! | `PORT` | Relay bind port | `5000` |
//! | `IPFS_API_URL` | Base URL of the IPFS node HTTP API | `http://127.0.0.1:5001` |
//! | `IPFS_TIMEOUT_SECS` | Timeout for calls to the IPFS node | none |
//! | `UPLOAD_MAX_BYTES` | Largest accepted document | `26214400` |
//! | `UPLOAD_FALLBACK` | `mock` or `fail` when the IPFS node errors | `mock` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | unset |
//! | `RELAY_URL` | Relay base URL used by the client | `http://localhost:5000` |
//! | `NETWORK` | Target network (`localhost` or `amoy`) | `localhost` |
//! | `CHAIN_RPC_URL` | RPC endpoint override | network preset |
//! | `POLYGON_AMOY_RPC_URL` | RPC endpoint for the Amoy preset | preset |
//! | `REGISTRY_ADDRESS` | Deployed identity registry contract | Hardhat deployment |
//! | `WALLET_PRIVATE_KEY` | Hex key for local signing | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::blockchain::{NetworkConfig, HARDHAT_LOCALHOST, POLYGON_AMOY};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const IPFS_API_URL_ENV: &str = "IPFS_API_URL";
pub const IPFS_TIMEOUT_SECS_ENV: &str = "IPFS_TIMEOUT_SECS";
pub const UPLOAD_MAX_BYTES_ENV: &str = "UPLOAD_MAX_BYTES";
pub const UPLOAD_FALLBACK_ENV: &str = "UPLOAD_FALLBACK";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

pub const RELAY_URL_ENV: &str = "RELAY_URL";
pub const NETWORK_ENV: &str = "NETWORK";
pub const CHAIN_RPC_URL_ENV: &str = "CHAIN_RPC_URL";
pub const POLYGON_AMOY_RPC_URL_ENV: &str = "POLYGON_AMOY_RPC_URL";
pub const REGISTRY_ADDRESS_ENV: &str = "REGISTRY_ADDRESS";
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001";
/// 25 MiB.
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000";
/// Address the registry lands at on a fresh Hardhat node.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

impl ConfigError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name,
            reason: reason.into(),
        }
    }
}

/// What the relay does when the IPFS node cannot store a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Answer with a synthesized `Qm…` hash, as if the upload succeeded.
    #[default]
    Mock,
    /// Answer `502 Bad Gateway`.
    Fail,
}

impl FallbackPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Certificate and key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Upload relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub ipfs_api_url: url::Url,
    pub ipfs_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
    pub fallback: FallbackPolicy,
    pub tls: Option<TlsPaths>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::invalid(HOST_ENV, e.to_string()))?;

        let ipfs_api_url = parse_url(
            IPFS_API_URL_ENV,
            &lookup(IPFS_API_URL_ENV).unwrap_or_else(|| DEFAULT_IPFS_API_URL.to_string()),
        )?;

        let ipfs_timeout = match lookup(IPFS_TIMEOUT_SECS_ENV) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid(IPFS_TIMEOUT_SECS_ENV, raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let max_upload_bytes = parse_or(&lookup, UPLOAD_MAX_BYTES_ENV, DEFAULT_UPLOAD_MAX_BYTES)?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::invalid(UPLOAD_MAX_BYTES_ENV, "must be positive"));
        }

        let fallback = match lookup(UPLOAD_FALLBACK_ENV) {
            Some(raw) => FallbackPolicy::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(UPLOAD_FALLBACK_ENV, raw.clone()))?,
            None => FallbackPolicy::default(),
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Incomplete(TLS_KEY_PATH_ENV, TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            bind_addr,
            ipfs_api_url,
            ipfs_timeout,
            max_upload_bytes,
            fallback,
            tls,
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None).expect("defaults are valid")
    }
}

/// Wallet gateway configuration used by the command-line client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub relay_url: url::Url,
    pub registry_address: String,
    pub private_key: Option<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = match lookup(NETWORK_ENV) {
            Some(raw) => network_by_name(&raw)
                .ok_or_else(|| ConfigError::invalid(NETWORK_ENV, raw.clone()))?,
            None => HARDHAT_LOCALHOST,
        };

        let preset_override = if network.chain_id == POLYGON_AMOY.chain_id {
            lookup(POLYGON_AMOY_RPC_URL_ENV)
        } else {
            None
        };
        let rpc_url = lookup(CHAIN_RPC_URL_ENV)
            .or(preset_override)
            .unwrap_or_else(|| network.rpc_url.to_string());
        parse_url(CHAIN_RPC_URL_ENV, &rpc_url)?;

        let relay_url = parse_url(
            RELAY_URL_ENV,
            &lookup(RELAY_URL_ENV).unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
        )?;

        let registry_address =
            lookup(REGISTRY_ADDRESS_ENV).unwrap_or_else(|| DEFAULT_REGISTRY_ADDRESS.to_string());

        let private_key = lookup(WALLET_PRIVATE_KEY_ENV).filter(|k| !k.trim().is_empty());

        Ok(Self {
            network,
            rpc_url,
            relay_url,
            registry_address,
            private_key,
        })
    }
}

/// Resolve a network preset by its short name.
pub fn network_by_name(name: &str) -> Option<NetworkConfig> {
    match name.trim().to_ascii_lowercase().as_str() {
        "localhost" | "hardhat" => Some(HARDHAT_LOCALHOST),
        "amoy" | "polygon-amoy" => Some(POLYGON_AMOY),
        _ => None,
    }
}

/// `url` as a directory, so relative joins keep its last path segment.
pub fn with_trailing_slash(url: &url::Url) -> url::Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(name, raw.clone())),
        None => Ok(default),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse()
        .map_err(|e: url::ParseError| ConfigError::invalid(name, e.to_string()))
}
