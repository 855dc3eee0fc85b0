// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Gateway
//!
//! Client-side orchestration of the identity flow:
//!
//! 1. [`IdentityGateway::connect`] selects the network, obtains the account
//!    and checks whether it is the registry administrator.
//! 2. [`IdentityGateway::create_identity`] uploads the document through the
//!    relay, then registers the returned hash on-chain.
//! 3. Administrators list identities and verify them.
//!
//! All state lives in a [`Session`] passed to each operation. Every failure is
//! logged and, for user-triggered operations, turned into a status line; no
//! operation is retried.

mod upload;

pub use upload::{Document, DocumentUploader, RelayUploadClient, UploadError, UploadResult};

use alloy::primitives::Address;
use futures_util::future::try_join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::blockchain::{
    parse_chain_id, ChainClientError, IdentityEntry, IdentityRegistry, NetworkConfig, TxReceipt,
};
use crate::wallet::{ensure_network, request_accounts, ProviderError, WalletProvider};

/// Client session, recreated on every wallet connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Primary account of the connected wallet
    pub connected_address: Option<Address>,
    /// Connected account is the registry administrator
    pub is_administrator: bool,
    /// Chain the wallet reported when connecting
    pub chain_id: Option<u64>,
    /// Identities loaded for the administrator, in registry order
    pub identities: Vec<IdentityEntry>,
    /// `identities` holds a successful listing from this session
    pub identities_loaded: bool,
    /// Last human-readable status
    pub status: Option<String>,
    /// An upload or transaction is in flight (advisory)
    pub busy: bool,
}

impl Session {
    fn connected(address: Address, chain_id: Option<u64>) -> Self {
        Self {
            connected_address: Some(address),
            chain_id,
            ..Self::default()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected_address.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Wallet(#[from] ProviderError),

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Display name is required")]
    MissingDisplayName,

    #[error("Another operation is in progress")]
    Busy,

    #[error(transparent)]
    Registry(#[from] ChainClientError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Wallet, registry and relay wired together.
pub struct IdentityGateway<W, R, U> {
    wallet: W,
    registry: R,
    uploader: U,
    network: NetworkConfig,
    rpc_url: String,
}

impl<W, R, U> IdentityGateway<W, R, U>
where
    W: WalletProvider,
    R: IdentityRegistry,
    U: DocumentUploader,
{
    pub fn new(wallet: W, registry: R, uploader: U, network: NetworkConfig) -> Self {
        Self {
            wallet,
            registry,
            uploader,
            network,
            rpc_url: network.rpc_url.to_string(),
        }
    }

    /// RPC endpoint offered to the wallet when the network must be added.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Connect the wallet and start a fresh session.
    ///
    /// Network switching problems are logged only. The administrator check
    /// runs before returning; its failure leaves the session non-admin.
    pub async fn connect(&self, session: &mut Session) -> Result<Address, GatewayError> {
        let address = self.open_session(session).await.inspect_err(|e| {
            error!(error = %e, "Error connecting wallet");
        })?;

        info!(
            account = %address,
            chain_id = ?session.chain_id,
            "Wallet connected"
        );

        // Failures are logged inside.
        let _ = self.check_administrator(session, address).await;

        Ok(address)
    }

    async fn open_session(&self, session: &mut Session) -> Result<Address, GatewayError> {
        let outcome = ensure_network(&self.wallet, &self.network, &self.rpc_url).await?;

        let accounts = request_accounts(&self.wallet).await?;
        let address = accounts.first().copied().ok_or(GatewayError::NoAccounts)?;

        let chain_id = if outcome.switched || outcome.added {
            match self.wallet.request("eth_chainId", Value::Null).await {
                Ok(v) => v.as_str().and_then(parse_chain_id).or(outcome.initial_chain_id),
                Err(e) => {
                    warn!(error = %e, "Could not re-read chain id after switching");
                    outcome.initial_chain_id
                }
            }
        } else {
            outcome.initial_chain_id
        };

        *session = Session::connected(address, chain_id);
        Ok(address)
    }

    /// Compare `address` with the registry administrator.
    ///
    /// A match sets the flag and loads the identity list once. A failed read
    /// keeps the previous flag.
    pub async fn check_administrator(
        &self,
        session: &mut Session,
        address: Address,
    ) -> Result<bool, GatewayError> {
        let admin = self.registry.admin().await.inspect_err(|e| {
            error!(error = %e, account = %address, "Error checking admin");
        })?;

        // Parsed addresses compare by bytes, so checksum casing is irrelevant.
        let is_admin = admin == address;
        session.is_administrator = is_admin;

        if is_admin {
            info!(account = %address, "Connected account is the registry administrator");
            // Failures are logged inside; the flag stays set.
            let _ = self.list_identities(session).await;
        }

        Ok(is_admin)
    }

    /// Load every identity in registry enumeration order.
    ///
    /// On failure the previously loaded list is kept.
    pub async fn list_identities<'s>(
        &self,
        session: &'s mut Session,
    ) -> Result<&'s [IdentityEntry], GatewayError> {
        let entries = self.fetch_identities().await.inspect_err(|e| {
            error!(error = %e, "Error loading users");
        })?;

        session.identities = entries;
        session.identities_loaded = true;
        Ok(&session.identities)
    }

    /// Identities already listed in this session, loading them only if no
    /// listing has succeeded yet.
    pub async fn loaded_identities<'s>(
        &self,
        session: &'s mut Session,
    ) -> Result<&'s [IdentityEntry], GatewayError> {
        if session.identities_loaded {
            return Ok(&session.identities);
        }
        self.list_identities(session).await
    }

    async fn fetch_identities(&self) -> Result<Vec<IdentityEntry>, GatewayError> {
        let users = self.registry.get_all_users().await?;

        // try_join_all yields results in input order.
        let reads = users.into_iter().map(|address| async move {
            self.registry
                .get_identity(address)
                .await
                .map(|record| IdentityEntry { address, record })
        });

        Ok(try_join_all(reads).await?)
    }

    /// Register an identity for the connected account and wait for the
    /// transaction to be mined.
    pub async fn register_identity(
        &self,
        session: &Session,
        display_name: &str,
        upload: &UploadResult,
    ) -> Result<TxReceipt, GatewayError> {
        let from = session.connected_address.ok_or(GatewayError::NotConnected)?;
        let receipt = self
            .registry
            .create_identity(from, display_name, upload.content_hash())
            .await?;

        info!(
            account = %from,
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            "Identity registered"
        );
        Ok(receipt)
    }

    /// Upload `document`, then register it under `display_name`.
    ///
    /// Nothing is registered unless the upload produced a hash.
    pub async fn create_identity(
        &self,
        session: &mut Session,
        display_name: &str,
        document: &Document,
    ) -> Result<TxReceipt, GatewayError> {
        if display_name.is_empty() {
            return Err(GatewayError::MissingDisplayName);
        }
        if !session.is_connected() {
            return Err(GatewayError::NotConnected);
        }
        if session.busy {
            return Err(GatewayError::Busy);
        }

        session.busy = true;
        let result = self.upload_and_register(session, display_name, document).await;
        session.busy = false;

        match &result {
            Ok(_) => session.status = Some("Identity Created Successfully!".to_string()),
            Err(e) => {
                error!(error = %e, "Error creating identity");
                session.status = Some(format!("Error creating identity: {e}"));
            }
        }

        result
    }

    async fn upload_and_register(
        &self,
        session: &mut Session,
        display_name: &str,
        document: &Document,
    ) -> Result<TxReceipt, GatewayError> {
        session.status = Some("Uploading to IPFS...".to_string());
        let upload = self.uploader.upload(document).await?;

        session.status = Some(format!(
            "IPFS Upload successful. Hash: {}. Confirming transaction...",
            upload.content_hash()
        ));

        self.register_identity(session, display_name, &upload).await
    }

    /// Mark `user` verified, then reload the list.
    ///
    /// The registry rejects non-administrators; that rejection becomes the
    /// status line.
    pub async fn verify_identity(
        &self,
        session: &mut Session,
        user: Address,
    ) -> Result<TxReceipt, GatewayError> {
        let from = session.connected_address.ok_or(GatewayError::NotConnected)?;
        if session.busy {
            return Err(GatewayError::Busy);
        }

        session.busy = true;
        let result = self
            .registry
            .verify_identity(from, user)
            .await
            .map_err(GatewayError::from);
        session.busy = false;

        match &result {
            Ok(receipt) => {
                info!(user = %user, tx_hash = %receipt.tx_hash, "Identity verified");
                session.status = Some(format!(
                    "User {}... verified successfully!",
                    short_address(&user)
                ));
                let _ = self.list_identities(session).await;
            }
            Err(e) => {
                error!(error = %e, user = %user, "Verification failed");
                session.status = Some(format!("Verification failed: {e}"));
            }
        }

        result
    }
}

/// First six characters of the checksummed address (`0x` plus four digits).
fn short_address(address: &Address) -> String {
    address.to_checksum(None)[..6].to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use alloy::primitives::Address;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::blockchain::{IdentityRecord, HARDHAT_LOCALHOST};

    const ADMIN: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const ALICE: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const BOB: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    // ---------------------------------------------------------------------------
    // Fakes
    // ---------------------------------------------------------------------------

    struct FakeWallet {
        chain_id: Mutex<String>,
        accounts: Vec<String>,
    }

    impl FakeWallet {
        fn new(chain_id: &str, accounts: &[&str]) -> Self {
            Self {
                chain_id: Mutex::new(chain_id.to_string()),
                accounts: accounts.iter().map(|a| a.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            match method {
                "eth_chainId" => Ok(json!(*self.chain_id.lock().unwrap())),
                "wallet_switchEthereumChain" => {
                    let target = params[0]["chainId"].as_str().unwrap_or_default().to_string();
                    *self.chain_id.lock().unwrap() = target;
                    Ok(Value::Null)
                }
                "eth_requestAccounts" => Ok(json!(self.accounts)),
                other => Err(ProviderError::new(-32601, format!("{other} not supported"))),
            }
        }
    }

    #[derive(Default)]
    struct RegistryState {
        users: Vec<Address>,
        identities: HashMap<Address, IdentityRecord>,
        block: u64,
    }

    #[derive(Clone)]
    struct FakeRegistry {
        admin: Address,
        state: Arc<Mutex<RegistryState>>,
        listings: Arc<AtomicUsize>,
        creates: Arc<AtomicUsize>,
        fail_admin: Arc<AtomicBool>,
        fail_listing: Arc<AtomicBool>,
    }

    impl FakeRegistry {
        fn new(admin: &str) -> Self {
            Self {
                admin: addr(admin),
                state: Arc::default(),
                listings: Arc::default(),
                creates: Arc::default(),
                fail_admin: Arc::default(),
                fail_listing: Arc::default(),
            }
        }

        fn with_identity(self, owner: &str, name: &str, hash: &str, verified: bool) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.users.push(addr(owner));
                state.identities.insert(
                    addr(owner),
                    IdentityRecord {
                        name: name.into(),
                        document_hash: hash.into(),
                        is_verified: verified,
                    },
                );
            }
            self
        }

        fn identity(&self, owner: &str) -> Option<IdentityRecord> {
            self.state.lock().unwrap().identities.get(&addr(owner)).cloned()
        }

        fn receipt(state: &mut RegistryState) -> TxReceipt {
            state.block += 1;
            TxReceipt {
                tx_hash: format!("0x{:064x}", state.block),
                block_number: state.block,
                gas_used: 21_000,
            }
        }
    }

    #[async_trait]
    impl IdentityRegistry for FakeRegistry {
        async fn admin(&self) -> Result<Address, ChainClientError> {
            if self.fail_admin.load(Ordering::SeqCst) {
                return Err(ChainClientError::RpcError("connection refused".into()));
            }
            Ok(self.admin)
        }

        async fn get_all_users(&self) -> Result<Vec<Address>, ChainClientError> {
            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(ChainClientError::ContractError("call reverted".into()));
            }
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(self.state.lock().unwrap().users.clone())
        }

        async fn get_identity(&self, user: Address) -> Result<IdentityRecord, ChainClientError> {
            self.state
                .lock()
                .unwrap()
                .identities
                .get(&user)
                .cloned()
                .ok_or_else(|| ChainClientError::ContractError("Identity does not exist".into()))
        }

        async fn create_identity(
            &self,
            from: Address,
            name: &str,
            document_hash: &str,
        ) -> Result<TxReceipt, ChainClientError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            let mut state = self.state.lock().unwrap();
            if state.identities.contains_key(&from) {
                return Err(ChainClientError::ContractError(
                    "execution reverted: Identity already exists".into(),
                ));
            }
            state.users.push(from);
            state.identities.insert(
                from,
                IdentityRecord {
                    name: name.into(),
                    document_hash: document_hash.into(),
                    is_verified: false,
                },
            );
            Ok(Self::receipt(&mut state))
        }

        async fn verify_identity(
            &self,
            from: Address,
            user: Address,
        ) -> Result<TxReceipt, ChainClientError> {
            if from != self.admin {
                return Err(ChainClientError::ContractError(
                    "execution reverted: Only admin can verify".into(),
                ));
            }
            let mut state = self.state.lock().unwrap();
            match state.identities.get_mut(&user) {
                Some(record) => record.is_verified = true,
                None => {
                    return Err(ChainClientError::ContractError(
                        "execution reverted: Identity does not exist".into(),
                    ))
                }
            }
            Ok(Self::receipt(&mut state))
        }
    }

    #[derive(Clone, Default)]
    struct FakeUploader {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DocumentUploader for FakeUploader {
        async fn upload(&self, document: &Document) -> Result<UploadResult, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(UploadError::Rejected(500));
            }
            Ok(UploadResult::new(format!("Qm{}", document.bytes.len())))
        }
    }

    type TestGateway = IdentityGateway<FakeWallet, FakeRegistry, FakeUploader>;

    fn gateway(wallet: FakeWallet, registry: &FakeRegistry, uploader: &FakeUploader) -> TestGateway {
        IdentityGateway::new(wallet, registry.clone(), uploader.clone(), HARDHAT_LOCALHOST)
    }

    fn passport() -> Document {
        Document::new("passport.pdf", b"%PDF-1.4 passport".to_vec())
    }

    // ---------------------------------------------------------------------------
    // Connection and administrator detection
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn non_admin_connection_stays_non_admin() {
        let registry = FakeRegistry::new(ADMIN).with_identity(BOB, "Bob", "QmBob", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        let account = gw.connect(&mut session).await.unwrap();

        assert_eq!(account, addr(ALICE));
        assert_eq!(session.connected_address, Some(addr(ALICE)));
        assert_eq!(session.chain_id, Some(31337));
        assert!(!session.is_administrator);
        assert!(session.identities.is_empty());
        assert_eq!(registry.listings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn admin_match_ignores_case_and_loads_once() {
        let registry = FakeRegistry::new(ADMIN)
            .with_identity(BOB, "Bob", "QmBob", false)
            .with_identity(ALICE, "Alice", "QmAlice", true);
        let lowercase_admin = ADMIN.to_lowercase();
        let gw = gateway(
            FakeWallet::new("0x7a69", &[lowercase_admin.as_str()]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        assert!(session.is_administrator);
        assert_eq!(registry.listings.load(Ordering::SeqCst), 1);
        let owners: Vec<Address> = session.identities.iter().map(|e| e.address).collect();
        assert_eq!(owners, vec![addr(BOB), addr(ALICE)]);
        assert_eq!(session.identities[1].record.name, "Alice");
        assert!(session.identities[1].record.is_verified);
    }

    #[tokio::test]
    async fn admin_listing_is_reused_after_connect() {
        let registry = FakeRegistry::new(ADMIN).with_identity(BOB, "Bob", "QmBob", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        let owners: Vec<Address> = gw
            .loaded_identities(&mut session)
            .await
            .unwrap()
            .iter()
            .map(|e| e.address)
            .collect();

        assert_eq!(owners, vec![addr(BOB)]);
        assert_eq!(registry.listings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_admin_listing_loads_on_demand() {
        let registry = FakeRegistry::new(ADMIN).with_identity(BOB, "Bob", "QmBob", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        assert!(!session.identities_loaded);

        assert_eq!(gw.loaded_identities(&mut session).await.unwrap().len(), 1);
        assert_eq!(gw.loaded_identities(&mut session).await.unwrap().len(), 1);
        assert_eq!(registry.listings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn admin_read_failure_keeps_previous_flag() {
        let registry = FakeRegistry::new(ADMIN);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session {
            connected_address: Some(addr(ADMIN)),
            is_administrator: true,
            ..Session::default()
        };
        registry.fail_admin.store(true, Ordering::SeqCst);

        let result = gw.check_administrator(&mut session, addr(ADMIN)).await;
        assert!(matches!(result, Err(GatewayError::Registry(_))));
        assert!(session.is_administrator);
    }

    #[tokio::test]
    async fn connect_survives_admin_read_failure() {
        let registry = FakeRegistry::new(ADMIN);
        registry.fail_admin.store(true, Ordering::SeqCst);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        let account = gw.connect(&mut session).await.unwrap();
        assert_eq!(account, addr(ADMIN));
        assert!(!session.is_administrator);
    }

    #[tokio::test]
    async fn wrong_chain_is_switched_before_connecting() {
        let registry = FakeRegistry::new(ADMIN);
        let gw = gateway(
            FakeWallet::new("0x1", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        assert_eq!(session.chain_id, Some(31337));
    }

    #[tokio::test]
    async fn empty_account_list_fails_connection() {
        let registry = FakeRegistry::new(ADMIN);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        let result = gw.connect(&mut session).await;
        assert!(matches!(result, Err(GatewayError::NoAccounts)));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn reconnecting_resets_the_session() {
        let registry = FakeRegistry::new(ADMIN);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session {
            is_administrator: true,
            status: Some("stale".into()),
            ..Session::default()
        };
        gw.connect(&mut session).await.unwrap();
        assert!(!session.is_administrator);
        assert!(session.status.is_none());
    }

    // ---------------------------------------------------------------------------
    // Listing
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn listing_twice_without_writes_is_identical() {
        let registry = FakeRegistry::new(ADMIN)
            .with_identity(ALICE, "Alice", "QmAlice", false)
            .with_identity(BOB, "Bob", "QmBob", true);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );
        let mut session = Session::default();

        let first = gw.list_identities(&mut session).await.unwrap().to_vec();
        let second = gw.list_identities(&mut session).await.unwrap().to_vec();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn listing_failure_keeps_loaded_list() {
        let registry = FakeRegistry::new(ADMIN).with_identity(ALICE, "Alice", "QmAlice", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );
        let mut session = Session::default();
        gw.list_identities(&mut session).await.unwrap();

        registry.fail_listing.store(true, Ordering::SeqCst);
        assert!(gw.list_identities(&mut session).await.is_err());
        assert_eq!(session.identities.len(), 1);
        assert_eq!(session.identities[0].record.name, "Alice");
    }

    // ---------------------------------------------------------------------------
    // Identity creation
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn create_identity_uploads_then_registers() {
        let registry = FakeRegistry::new(ADMIN);
        let uploader = FakeUploader::default();
        let gw = gateway(FakeWallet::new("0x7a69", &[ALICE]), &registry, &uploader);

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        let document = passport();
        let receipt = gw
            .create_identity(&mut session, "Alice", &document)
            .await
            .unwrap();

        assert_eq!(receipt.block_number, 1);
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            registry.identity(ALICE),
            Some(IdentityRecord {
                name: "Alice".into(),
                document_hash: format!("Qm{}", document.bytes.len()),
                is_verified: false,
            })
        );
        assert_eq!(session.status.as_deref(), Some("Identity Created Successfully!"));
        assert!(!session.busy);
    }

    #[tokio::test]
    async fn failed_upload_never_registers() {
        let registry = FakeRegistry::new(ADMIN);
        let uploader = FakeUploader {
            fail: true,
            ..FakeUploader::default()
        };
        let gw = gateway(FakeWallet::new("0x7a69", &[ALICE]), &registry, &uploader);

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        let result = gw.create_identity(&mut session, "Alice", &passport()).await;

        assert!(matches!(result, Err(GatewayError::Upload(_))));
        assert_eq!(registry.creates.load(Ordering::SeqCst), 0);
        assert_eq!(
            session.status.as_deref(),
            Some("Error creating identity: Failed to upload to IPFS")
        );
        assert!(!session.busy);
    }

    #[tokio::test]
    async fn rejected_registration_is_reported() {
        let registry = FakeRegistry::new(ADMIN).with_identity(ALICE, "Alice", "QmOld", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        let result = gw.create_identity(&mut session, "Alice", &passport()).await;
        assert!(matches!(result, Err(GatewayError::Registry(_))));
        let status = session.status.unwrap();
        assert!(status.starts_with("Error creating identity: "));
        assert!(status.contains("Identity already exists"));
    }

    #[tokio::test]
    async fn create_identity_requires_name_and_connection() {
        let registry = FakeRegistry::new(ADMIN);
        let uploader = FakeUploader::default();
        let gw = gateway(FakeWallet::new("0x7a69", &[ALICE]), &registry, &uploader);

        let mut session = Session::default();
        assert!(matches!(
            gw.create_identity(&mut session, "Alice", &passport()).await,
            Err(GatewayError::NotConnected)
        ));

        gw.connect(&mut session).await.unwrap();
        assert!(matches!(
            gw.create_identity(&mut session, "", &passport()).await,
            Err(GatewayError::MissingDisplayName)
        ));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_name_is_still_a_name() {
        let registry = FakeRegistry::new(ADMIN);
        let uploader = FakeUploader::default();
        let gw = gateway(FakeWallet::new("0x7a69", &[ALICE]), &registry, &uploader);

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        gw.create_identity(&mut session, "  ", &passport())
            .await
            .unwrap();

        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.identity(ALICE).unwrap().name, "  ");
    }

    #[tokio::test]
    async fn busy_session_refuses_second_operation() {
        let registry = FakeRegistry::new(ADMIN);
        let uploader = FakeUploader::default();
        let gw = gateway(FakeWallet::new("0x7a69", &[ADMIN]), &registry, &uploader);

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        session.busy = true;

        assert!(matches!(
            gw.create_identity(&mut session, "Admin", &passport()).await,
            Err(GatewayError::Busy)
        ));
        assert!(matches!(
            gw.verify_identity(&mut session, addr(ALICE)).await,
            Err(GatewayError::Busy)
        ));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn register_identity_uses_upload_hash() {
        let registry = FakeRegistry::new(ADMIN);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[BOB]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        let upload = UploadResult::new("QmRealHash");
        gw.register_identity(&session, "Bob", &upload).await.unwrap();
        assert_eq!(registry.identity(BOB).unwrap().document_hash, "QmRealHash");
    }

    // ---------------------------------------------------------------------------
    // Verification
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn admin_verification_refreshes_list() {
        let registry = FakeRegistry::new(ADMIN).with_identity(ALICE, "Alice", "QmAlice", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ADMIN]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();
        assert!(!session.identities[0].record.is_verified);

        gw.verify_identity(&mut session, addr(ALICE)).await.unwrap();

        assert_eq!(
            session.status.as_deref(),
            Some("User 0x7099... verified successfully!")
        );
        assert!(session.identities[0].record.is_verified);
        assert_eq!(registry.listings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_admin_verification_surfaces_rejection() {
        let registry = FakeRegistry::new(ADMIN).with_identity(BOB, "Bob", "QmBob", false);
        let gw = gateway(
            FakeWallet::new("0x7a69", &[ALICE]),
            &registry,
            &FakeUploader::default(),
        );

        let mut session = Session::default();
        gw.connect(&mut session).await.unwrap();

        let result = gw.verify_identity(&mut session, addr(BOB)).await;

        assert!(matches!(result, Err(GatewayError::Registry(_))));
        let status = session.status.unwrap();
        assert!(status.starts_with("Verification failed: "));
        assert!(status.contains("Only admin can verify"));
        assert!(!registry.identity(BOB).unwrap().is_verified);
        assert!(!session.busy);
    }
}
