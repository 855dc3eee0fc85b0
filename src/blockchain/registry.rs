// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity registry contract interactions.

use std::str::FromStr;

use alloy::{
    primitives::Address,
    providers::DynProvider,
    rpc::types::TransactionReceipt,
    sol,
};
use async_trait::async_trait;

use super::client::ChainClientError;
use super::types::{IdentityRecord, TxReceipt};

// Define the registry interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IIdentityRegistry {
        function admin() external view returns (address);
        function getAllUsers() external view returns (address[] memory);
        function getIdentity(address user) external view returns (string memory name, string memory documentHash, bool isVerified);
        function createIdentity(string calldata name, string calldata documentHash) external;
        function verifyIdentity(address user) external;
    }
}

/// Remote surface of the on-chain identity registry.
///
/// Reads reflect the latest block at call time. Writes resolve only once the
/// transaction is mined.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    /// Account allowed to verify identities.
    async fn admin(&self) -> Result<Address, ChainClientError>;

    /// Every address that ever registered, in registry order.
    async fn get_all_users(&self) -> Result<Vec<Address>, ChainClientError>;

    async fn get_identity(&self, user: Address) -> Result<IdentityRecord, ChainClientError>;

    /// Register an identity owned by `from`.
    async fn create_identity(
        &self,
        from: Address,
        name: &str,
        document_hash: &str,
    ) -> Result<TxReceipt, ChainClientError>;

    /// Mark `user` verified. The registry rejects callers other than the admin.
    async fn verify_identity(&self, from: Address, user: Address)
        -> Result<TxReceipt, ChainClientError>;
}

/// Registry deployed on an EVM chain, reached over JSON-RPC.
pub struct EvmRegistry {
    contract: IIdentityRegistry::IIdentityRegistryInstance<DynProvider>,
}

impl EvmRegistry {
    pub fn new(provider: DynProvider, contract_address: &str) -> Result<Self, ChainClientError> {
        let address = Address::from_str(contract_address)
            .map_err(|e| ChainClientError::InvalidAddress(e.to_string()))?;

        Ok(Self {
            contract: IIdentityRegistry::new(address, provider),
        })
    }

    /// Deployed contract address.
    pub fn address(&self) -> Address {
        *self.contract.address()
    }
}

#[async_trait]
impl IdentityRegistry for EvmRegistry {
    async fn admin(&self) -> Result<Address, ChainClientError> {
        self.contract
            .admin()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn get_all_users(&self) -> Result<Vec<Address>, ChainClientError> {
        self.contract
            .getAllUsers()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn get_identity(&self, user: Address) -> Result<IdentityRecord, ChainClientError> {
        let identity = self
            .contract
            .getIdentity(user)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        Ok(IdentityRecord {
            name: identity.name,
            document_hash: identity.documentHash,
            is_verified: identity.isVerified,
        })
    }

    async fn create_identity(
        &self,
        from: Address,
        name: &str,
        document_hash: &str,
    ) -> Result<TxReceipt, ChainClientError> {
        let pending = self
            .contract
            .createIdentity(name.to_string(), document_hash.to_string())
            .from(from)
            .send()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        tracing::debug!(tx_hash = %pending.tx_hash(), "createIdentity submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        confirmed(receipt)
    }

    async fn verify_identity(
        &self,
        from: Address,
        user: Address,
    ) -> Result<TxReceipt, ChainClientError> {
        let pending = self
            .contract
            .verifyIdentity(user)
            .from(from)
            .send()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))?;

        tracing::debug!(tx_hash = %pending.tx_hash(), user = %user, "verifyIdentity submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        confirmed(receipt)
    }
}

/// Reject reverted transactions.
fn confirmed(receipt: TransactionReceipt) -> Result<TxReceipt, ChainClientError> {
    let tx_hash = format!("{:#x}", receipt.transaction_hash);
    if !receipt.status() {
        return Err(ChainClientError::TransactionFailed(format!(
            "transaction {tx_hash} reverted"
        )));
    }

    Ok(TxReceipt {
        tx_hash,
        block_number: receipt.block_number.unwrap_or(0),
        gas_used: receipt.gas_used as u64,
    })
}
