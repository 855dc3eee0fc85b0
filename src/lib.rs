// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC Identity - IPFS Upload Relay and Identity Registry Gateway
//!
//! Users register an identity (display name plus a document stored on IPFS)
//! with an on-chain registry; the registry administrator verifies them.
//!
//! ## Modules
//!
//! - `api` - Upload relay HTTP handlers (Axum)
//! - `ipfs` - IPFS node client and mock hash fallback
//! - `wallet` - EIP-1193 style wallet provider and network selection
//! - `blockchain` - Identity registry contract bindings (alloy)
//! - `gateway` - Session workflow: connect, list, register, verify
//! - `server` - Relay listener (HTTP or rustls) and graceful shutdown
//! - `config` - Environment configuration for both binaries

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ipfs;
pub mod logging;
pub mod models;
pub mod server;
pub mod state;
pub mod wallet;
