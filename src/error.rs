// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay error responses. Every failure is answered as `{"error": "..."}`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::ipfs::IpfsError;

/// Message for any upload failure not caused by the client.
pub const UPLOAD_FAILED: &str = "Error processing upload";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File exceeds the {limit} byte upload limit"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Oversized bodies keep their 413; any other decoding problem is a
/// generic upload failure.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.body_text());
        }
        error!(error = %err.body_text(), "Failed to read multipart body");
        Self::internal(UPLOAD_FAILED)
    }
}

/// Only reached when the mock fallback is disabled.
impl From<IpfsError> for ApiError {
    fn from(err: IpfsError) -> Self {
        match err {
            IpfsError::Config(_) => Self::internal(UPLOAD_FAILED),
            IpfsError::Request(_) | IpfsError::Status { .. } | IpfsError::InvalidResponse(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "IPFS upload failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
