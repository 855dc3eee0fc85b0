// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Provider
//!
//! An EIP-1193 style request interface to whatever holds the user's keys,
//! plus the network selection performed before connecting.
//!
//! - [`JsonRpcWallet`] forwards requests to a JSON-RPC node whose accounts
//!   are unlocked (a Hardhat node).
//! - [`SignerWallet`] answers account requests with a local signer's address
//!   and forwards everything else.

mod jsonrpc;
mod network;

pub use jsonrpc::{JsonRpcWallet, SignerWallet};
pub use network::{ensure_network, request_accounts, NetworkOutcome};

use async_trait::async_trait;
use serde_json::Value;

/// The requested chain has not been added to the wallet.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// The user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// The method is not supported by the provider.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Internal or transport error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Error answered by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("wallet error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// Request channel to the user's wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}
