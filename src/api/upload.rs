// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document upload endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{error, info, warn};

use crate::{
    config::FallbackPolicy,
    error::ApiError,
    ipfs::{mock_content_hash, UploadedFile},
    models::{UploadForm, UploadResponse},
    state::AppState,
};

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Store a document on the IPFS node and return its content hash.
///
/// When the node is unavailable and the fallback policy is `mock`, a
/// synthesized hash is returned with the same response shape.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "Upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored (or mocked)", body = UploadResponse),
        (status = 400, description = "No file uploaded"),
        (status = 413, description = "Document exceeds the configured size limit"),
        (status = 500, description = "Error processing upload"),
        (status = 502, description = "IPFS node failed and mock fallback is disabled")
    )
)]
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_field(&mut multipart, state.config.max_upload_bytes)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let size = file.bytes.len();
    let ipfs_hash = match state.ipfs.add(&file).await {
        Ok(hash) => {
            info!(ipfs_hash = %hash, size, "File uploaded to IPFS");
            hash
        }
        Err(e) => match state.config.fallback {
            FallbackPolicy::Mock => {
                let mock = mock_content_hash();
                warn!(
                    error = %e,
                    mock_hash = %mock,
                    "IPFS upload failed, falling back to mock IPFS hash"
                );
                mock
            }
            FallbackPolicy::Fail => {
                error!(error = %e, "IPFS upload failed");
                return Err(e.into());
            }
        },
    };

    Ok(Json(UploadResponse::new(ipfs_hash)))
}

/// Buffer the first `file` part that carries a file name.
async fn read_file_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Plain form values named `file` are not files.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.len() > limit {
            return Err(ApiError::payload_too_large(limit));
        }

        return Ok(Some(UploadedFile {
            file_name: Some(file_name),
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
