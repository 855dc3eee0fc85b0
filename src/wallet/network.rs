// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use alloy::primitives::Address;
use serde_json::Value;
use tracing::{info, warn};

use super::{ProviderError, WalletProvider, METHOD_NOT_FOUND, UNRECOGNIZED_CHAIN};
use crate::blockchain::{parse_chain_id, NetworkConfig};

/// What [`ensure_network`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkOutcome {
    /// Chain the wallet reported before any switch
    pub initial_chain_id: Option<u64>,
    /// A switch was requested and accepted
    pub switched: bool,
    /// The network was unknown and has been added
    pub added: bool,
}

/// Ask the wallet to move to `network`.
///
/// Only reading the current chain can fail this call. A refused switch or add
/// is logged and connection continues on whatever network the wallet is on.
pub async fn ensure_network<W>(
    wallet: &W,
    network: &NetworkConfig,
    rpc_url: &str,
) -> Result<NetworkOutcome, ProviderError>
where
    W: WalletProvider + ?Sized,
{
    let current = wallet.request("eth_chainId", Value::Null).await?;
    let current = current.as_str().unwrap_or_default().to_string();
    let target = network.chain_id_hex();

    let mut outcome = NetworkOutcome {
        initial_chain_id: parse_chain_id(&current),
        ..NetworkOutcome::default()
    };

    if outcome.initial_chain_id == Some(network.chain_id) {
        return Ok(outcome);
    }

    info!(current = %current, target = %target, "Wallet on a different chain, switching");

    match wallet
        .request("wallet_switchEthereumChain", network.switch_chain_params())
        .await
    {
        Ok(_) => outcome.switched = true,
        Err(e) if e.code == UNRECOGNIZED_CHAIN => {
            match wallet
                .request("wallet_addEthereumChain", network.add_chain_params(rpc_url))
                .await
            {
                Ok(_) => outcome.added = true,
                Err(e) => warn!(error = %e, chain = %target, "Failed to add network"),
            }
        }
        Err(e) => warn!(error = %e, chain = %target, "Failed to switch network"),
    }

    Ok(outcome)
}

/// Request account access; the first entry is the primary account.
pub async fn request_accounts<W>(wallet: &W) -> Result<Vec<Address>, ProviderError>
where
    W: WalletProvider + ?Sized,
{
    // Plain nodes only know `eth_accounts`.
    let accounts = match wallet.request("eth_requestAccounts", Value::Null).await {
        Err(e) if e.code == METHOD_NOT_FOUND => wallet.request("eth_accounts", Value::Null).await?,
        other => other?,
    };
    serde_json::from_value(accounts)
        .map_err(|e| ProviderError::internal(format!("malformed account list: {e}")))
}
