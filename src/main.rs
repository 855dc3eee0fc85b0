// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use axum_server::Handle;
use tracing::info;

use kyc_identity::{
    api::router,
    config::{LogFormat, RelayConfig},
    logging, server,
    state::AppState,
};

#[tokio::main]
async fn main() {
    logging::init(LogFormat::from_env(), std::io::stdout);

    let config = RelayConfig::from_env().expect("Invalid relay configuration");
    let addr = config.bind_addr;
    let tls = config.tls.clone();

    info!(
        ipfs_api_url = %config.ipfs_api_url,
        fallback = ?config.fallback,
        max_upload_bytes = config.max_upload_bytes,
        "Relay configuration loaded"
    );

    let state = AppState::new(config).expect("Failed to build IPFS client");
    let app = router(state);

    let handle = Handle::<SocketAddr>::new();
    tokio::spawn(server::drain_on(handle.clone(), server::shutdown_signal()));

    server::serve(app, addr, tls.as_ref(), handle)
        .await
        .expect("Relay server failed");

    info!("Relay stopped");
}
