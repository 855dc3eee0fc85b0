// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the identity registry.
//!
//! This module provides functionality for:
//! - Building RPC providers, optionally with a local signer
//! - Reading identities and the registry administrator
//! - Submitting identity creation and verification transactions

pub mod client;
pub mod registry;
pub mod types;

pub use client::{connect_provider, create_signer, ChainClientError};
pub use registry::{EvmRegistry, IdentityRegistry};
pub use types::*;
