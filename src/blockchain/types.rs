// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// EVM network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display (also the wallet's `chainName`)
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Native currency name
    pub currency_name: &'static str,
    /// Native currency symbol
    pub currency_symbol: &'static str,
    /// Native currency decimals
    pub currency_decimals: u8,
}

/// Local Hardhat node.
pub const HARDHAT_LOCALHOST: NetworkConfig = NetworkConfig {
    name: "Hardhat Localhost",
    chain_id: 31337,
    rpc_url: "http://127.0.0.1:8545",
    currency_name: "ETH",
    currency_symbol: "ETH",
    currency_decimals: 18,
};

/// Polygon Amoy testnet.
pub const POLYGON_AMOY: NetworkConfig = NetworkConfig {
    name: "Polygon Amoy",
    chain_id: 80002,
    rpc_url: "https://rpc-amoy.polygon.technology/",
    currency_name: "POL",
    currency_symbol: "POL",
    currency_decimals: 18,
};

impl NetworkConfig {
    /// Chain id as wallets expect it (`0x`-prefixed lowercase hex).
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Parameters for `wallet_switchEthereumChain`.
    pub fn switch_chain_params(&self) -> Value {
        json!([{ "chainId": self.chain_id_hex() }])
    }

    /// Parameters for `wallet_addEthereumChain`, pointing at `rpc_url`.
    pub fn add_chain_params(&self, rpc_url: &str) -> Value {
        json!([{
            "chainId": self.chain_id_hex(),
            "chainName": self.name,
            "rpcUrls": [rpc_url],
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.currency_symbol,
                "decimals": self.currency_decimals,
            },
        }])
    }
}

/// Parse a `0x`-prefixed hex chain id as returned by `eth_chainId`.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Identity as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Display name chosen by the owner
    pub name: String,
    /// Content hash of the uploaded identity document
    pub document_hash: String,
    /// Set once by the registry administrator
    pub is_verified: bool,
}

/// Identity together with its owner, as listed for the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEntry {
    pub address: Address,
    #[serde(flatten)]
    pub record: IdentityRecord,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
}
