// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    config::RelayConfig,
    ipfs::{IpfsClient, IpfsError},
};

/// Shared, read-only relay state. Requests do not share anything mutable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub ipfs: IpfsClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, IpfsError> {
        let ipfs = IpfsClient::new(&config.ipfs_api_url, config.ipfs_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            ipfs,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RelayConfig::default()).expect("default relay config builds an IPFS client")
    }
}
