// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document upload through the relay.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Client};

use crate::config::with_trailing_slash;
use crate::models::UploadResponse;

/// File selected by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a document from disk, naming it after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

/// Content hash returned by an upload.
///
/// Only uploaders inside this crate can produce one, so an identity can only
/// be registered with a hash that went through an upload first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    content_hash: String,
}

impl UploadResult {
    pub(crate) fn new(content_hash: impl Into<String>) -> Self {
        Self {
            content_hash: content_hash.into(),
        }
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to upload to IPFS")]
    Rejected(u16),

    #[error("Upload request failed: {0}")]
    Request(String),

    #[error("Upload response was invalid: {0}")]
    InvalidResponse(String),
}

/// Stores a document and returns its content hash.
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn upload(&self, document: &Document) -> Result<UploadResult, UploadError>;
}

/// Uploads documents through the relay's `POST /upload`.
#[derive(Debug, Clone)]
pub struct RelayUploadClient {
    upload_url: url::Url,
    http: Client,
}

impl RelayUploadClient {
    pub fn new(relay_url: &url::Url) -> Result<Self, UploadError> {
        let upload_url = with_trailing_slash(relay_url)
            .join("upload")
            .map_err(|e| UploadError::Request(format!("invalid relay URL: {e}")))?;

        Ok(Self {
            upload_url,
            http: Client::new(),
        })
    }

    pub fn upload_url(&self) -> &url::Url {
        &self.upload_url
    }
}

#[async_trait]
impl DocumentUploader for RelayUploadClient {
    async fn upload(&self, document: &Document) -> Result<UploadResult, UploadError> {
        let mut part = multipart::Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone());
        if let Some(content_type) = &document.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| UploadError::Request(format!("invalid content type: {e}")))?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected(status.as_u16()));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        Ok(UploadResult::new(body.ipfs_hash))
    }
}
