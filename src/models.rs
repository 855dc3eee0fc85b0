// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the upload relay. The relay answers
//! with the same JSON shape whether the hash came from the IPFS node or from
//! the mock fallback, and the client decodes it with the same type.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload`.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// Identity document to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UploadResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Content hash of the stored document.
    #[serde(rename = "ipfsHash")]
    pub ipfs_hash: String,
}

impl UploadResponse {
    pub const MESSAGE: &'static str = "File uploaded successfully (or mocked)";

    pub fn new(ipfs_hash: impl Into<String>) -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
            ipfs_hash: ipfs_hash.into(),
        }
    }
}
