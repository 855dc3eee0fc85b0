// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ProviderError, WalletProvider};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Wallet reached over JSON-RPC 2.0 / HTTP.
#[derive(Debug)]
pub struct JsonRpcWallet {
    url: url::Url,
    http: Client,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    pub fn new(url: url::Url) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: url::Url, http: Client) -> Self {
        Self {
            url,
            http,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params = if params.is_null() { json!([]) } else { params };
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(method, id, "wallet request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::internal(format!("{method} failed: {e}")))?;

        let status = response.status();
        let body: RpcResponse = response.json().await.map_err(|e| {
            ProviderError::internal(format!("{method} returned an invalid response ({status}): {e}"))
        })?;

        if let Some(error) = body.error {
            return Err(ProviderError::new(error.code, error.message));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }
}

/// Wallet whose account is a local signer.
///
/// Account requests are answered with the signer's address; chain queries and
/// network management are forwarded to the underlying node.
#[derive(Debug)]
pub struct SignerWallet {
    inner: JsonRpcWallet,
    account: Address,
}

impl SignerWallet {
    pub fn new(inner: JsonRpcWallet, account: Address) -> Self {
        Self { inner, account }
    }
}

#[async_trait]
impl WalletProvider for SignerWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.account])),
            _ => self.inner.request(method, params).await,
        }
    }
}
