// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line wallet gateway for the identity registry.
//!
//! Every command connects first (network selection, account, administrator
//! check), then performs its operation and prints the result as JSON on
//! stdout. Logs go to stderr.

use std::{path::PathBuf, process::ExitCode};

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::error;

use kyc_identity::{
    blockchain::{connect_provider, create_signer, ChainClientError, EvmRegistry},
    config::{
        ConfigError, GatewayConfig, LogFormat, CHAIN_RPC_URL_ENV, NETWORK_ENV, REGISTRY_ADDRESS_ENV,
        RELAY_URL_ENV, WALLET_PRIVATE_KEY_ENV,
    },
    gateway::{Document, GatewayError, IdentityGateway, RelayUploadClient, Session, UploadError},
    logging,
    wallet::{JsonRpcWallet, SignerWallet, WalletProvider},
};

#[derive(Debug, Parser)]
#[command(name = "kyc-client", version, about = "Register and verify KYC identities")]
struct Cli {
    /// Network preset (`localhost` or `amoy`)
    #[arg(long, env = NETWORK_ENV)]
    network: Option<String>,

    /// RPC endpoint, overriding the preset
    #[arg(long, env = CHAIN_RPC_URL_ENV)]
    rpc_url: Option<String>,

    /// Upload relay base URL
    #[arg(long, env = RELAY_URL_ENV)]
    relay_url: Option<String>,

    /// Identity registry contract address
    #[arg(long, env = REGISTRY_ADDRESS_ENV)]
    registry: Option<String>,

    /// Sign locally with this key instead of a node-managed account
    #[arg(long, env = WALLET_PRIVATE_KEY_ENV, hide_env_values = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect the wallet and show the session
    Connect,
    /// List every registered identity
    List,
    /// Upload a document and register it under a display name
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
        /// MIME type sent with the document
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Mark a user's identity as verified (administrator only)
    Verify {
        #[arg(long)]
        address: Address,
    },
}

impl Cli {
    /// Flag values keyed by the environment variable they stand for.
    fn overrides(&self) -> Vec<(&'static str, String)> {
        [
            (NETWORK_ENV, &self.network),
            (CHAIN_RPC_URL_ENV, &self.rpc_url),
            (RELAY_URL_ENV, &self.relay_url),
            (REGISTRY_ADDRESS_ENV, &self.registry),
            (WALLET_PRIVATE_KEY_ENV, &self.private_key),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to read document: {0}")]
    Document(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<ChainClientError> for ClientError {
    fn from(e: ChainClientError) -> Self {
        Self::Gateway(GatewayError::Registry(e))
    }
}

impl From<UploadError> for ClientError {
    fn from(e: UploadError) -> Self {
        Self::Gateway(GatewayError::Upload(e))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LogFormat::from_env(), std::io::stderr);

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "kyc-client failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let overrides = cli.overrides();
    let config = GatewayConfig::from_lookup(|name| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .or_else(|| std::env::var(name).ok())
    })?;

    let rpc_url: url::Url = config
        .rpc_url
        .parse()
        .map_err(|e: url::ParseError| ConfigError::invalid(CHAIN_RPC_URL_ENV, e.to_string()))?;
    let node = JsonRpcWallet::new(rpc_url);
    let uploader = RelayUploadClient::new(&config.relay_url)?;

    match config.private_key.as_deref() {
        Some(key) => {
            let signer = create_signer(key)?;
            let wallet = SignerWallet::new(node, signer.address());
            let provider = connect_provider(&config.rpc_url, Some(signer))?;
            let registry = EvmRegistry::new(provider, &config.registry_address)?;
            execute(cli.command, wallet, registry, uploader, &config).await
        }
        None => {
            let provider = connect_provider(&config.rpc_url, None)?;
            let registry = EvmRegistry::new(provider, &config.registry_address)?;
            execute(cli.command, node, registry, uploader, &config).await
        }
    }
}

async fn execute<W: WalletProvider>(
    command: Command,
    wallet: W,
    registry: EvmRegistry,
    uploader: RelayUploadClient,
    config: &GatewayConfig,
) -> Result<(), ClientError> {
    let gateway = IdentityGateway::new(wallet, registry, uploader, config.network)
        .with_rpc_url(config.rpc_url.clone());

    let mut session = Session::default();
    gateway.connect(&mut session).await?;

    let output = match command {
        Command::Connect => json!({
            "account": session.connected_address,
            "chainId": session.chain_id,
            "network": gateway.network().name,
            "isAdministrator": session.is_administrator,
            "identities": session.identities,
        }),
        Command::List => {
            let identities = gateway.loaded_identities(&mut session).await?;
            serde_json::to_value(identities)?
        }
        Command::Register {
            name,
            file,
            content_type,
        } => {
            let mut document = Document::from_path(&file).await?;
            if let Some(content_type) = content_type {
                document = document.with_content_type(content_type);
            }
            let result = gateway.create_identity(&mut session, &name, &document).await;
            print_status(&session);
            let receipt = result?;
            json!({ "txHash": receipt.tx_hash, "blockNumber": receipt.block_number })
        }
        Command::Verify { address } => {
            let result = gateway.verify_identity(&mut session, address).await;
            print_status(&session);
            let receipt = result?;
            json!({
                "txHash": receipt.tx_hash,
                "blockNumber": receipt.block_number,
                "identities": session.identities,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_status(session: &Session) {
    if let Some(status) = &session.status {
        eprintln!("{status}");
    }
}
