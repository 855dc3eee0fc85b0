// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::config::FallbackPolicy;
use crate::state::AppState;

/// Banner served on `GET /`.
pub const BANNER: &str = "Decentralized Identity Server Running";

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// IPFS node reachability ("ok" or "unavailable").
    pub ipfs: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Relay banner", body = String, content_type = "text/plain")
    )
)]
pub async fn root() -> &'static str {
    BANNER
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Probes the IPFS node. An unreachable node only makes the relay unready
/// when uploads cannot fall back to mock hashes.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let ipfs_ok = match state.ipfs.version().await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "IPFS node is not reachable");
            false
        }
    };

    let response = ReadyResponse {
        status: if ipfs_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            ipfs: if ipfs_ok { "ok" } else { "unavailable" }.to_string(),
        },
    };

    let status = match (ipfs_ok, state.config.fallback) {
        (true, _) | (false, FallbackPolicy::Mock) => StatusCode::OK,
        (false, FallbackPolicy::Fail) => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}
