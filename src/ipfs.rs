// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IPFS node HTTP API client used by the upload relay.

use std::time::Duration;

use reqwest::{multipart, Client};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::with_trailing_slash;

/// Base58 alphabet used by CIDv0 hashes.
const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of a CIDv0 (`Qm` + 44 base58 characters).
pub const CID_V0_LEN: usize = 46;

/// A file received by the relay.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum IpfsError {
    #[error("IPFS configuration invalid: {0}")]
    Config(String),

    #[error("IPFS request failed: {0}")]
    Request(String),

    #[error("IPFS node returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IPFS response was invalid: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "Version")]
    version: String,
}

/// Client for the node's `/api/v0` endpoints.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    add_url: url::Url,
    version_url: url::Url,
    http: Client,
}

impl IpfsClient {
    pub fn new(api_url: &url::Url, timeout: Option<Duration>) -> Result<Self, IpfsError> {
        let api_url = with_trailing_slash(api_url);
        let join = |path: &str| {
            api_url
                .join(path)
                .map_err(|e| IpfsError::Config(format!("invalid API URL: {e}")))
        };

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| IpfsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            add_url: join("api/v0/add")?,
            version_url: join("api/v0/version")?,
            http,
        })
    }

    /// Store `file` and return its content hash.
    pub async fn add(&self, file: &UploadedFile) -> Result<String, IpfsError> {
        let mut part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone().unwrap_or_else(|| "file".to_string()));
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| IpfsError::Request(format!("invalid content type: {e}")))?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.add_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| IpfsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IpfsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::InvalidResponse(e.to_string()))?;

        Ok(added.hash)
    }

    /// Node version, used as a reachability probe.
    pub async fn version(&self) -> Result<String, IpfsError> {
        let response = self
            .http
            .post(self.version_url.clone())
            .send()
            .await
            .map_err(|e| IpfsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IpfsError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let version: VersionResponse = response
            .json()
            .await
            .map_err(|e| IpfsError::InvalidResponse(e.to_string()))?;

        Ok(version.version)
    }
}

/// Base58 digits drawn from one UUID; 58^15 is far below 2^122, so the
/// digits stay close to uniform.
const DIGITS_PER_UUID: usize = 15;

/// Random stand-in shaped like a CIDv0 (`Qm` + 44 base58 characters).
///
/// It does not address any content.
pub fn mock_content_hash() -> String {
    let mut hash = String::with_capacity(CID_V0_LEN);
    hash.push_str("Qm");

    while hash.len() < CID_V0_LEN {
        let mut bits = uuid_random_bits(Uuid::new_v4());
        for _ in 0..DIGITS_PER_UUID.min(CID_V0_LEN - hash.len()) {
            hash.push(BASE58_ALPHABET[(bits % 58) as usize] as char);
            bits /= 58;
        }
    }

    hash
}

/// The 122 random bits of a v4 UUID, without the version and variant fields.
fn uuid_random_bits(id: Uuid) -> u128 {
    let v = id.as_u128();
    let high = v >> 80;
    let mid = (v >> 64) & 0xfff;
    let low = v & ((1 << 62) - 1);
    (high << 74) | (mid << 62) | low
}
