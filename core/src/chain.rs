// Copyright (c) 2018-2024 Zondax AG

//! Chain configuration lookup
//!
//! Maps a (coin type, HRP) pair to the signing policy for that chain: which
//! digest is computed over the transaction bytes, how the account address is
//! derived, and whether signing is restricted to expert mode.
//!
//! Coin type 118' (the Cosmos default) is accepted with any HRP for backward
//! compatibility with pre-HRP hosts. Other coin types are matched exactly
//! against the table below; anything else is rejected before path or
//! transaction validation.

use ledger_cosm_apdu::path::HARDENED;

/// Cosmos default coin type (hardened)
pub const COIN_TYPE_COSMOS: u32 = 118 | HARDENED;

/// Ethereum-scheme coin type (hardened)
pub const COIN_TYPE_EVM: u32 = 60 | HARDENED;

/// Chain id for which the default denomination is converted for display
pub const DEFAULT_CHAIN_ID: &str = "cosmoshub-3";

/// Default base denomination and its display form
pub const DEFAULT_DENOM_BASE: &str = "uatom";
pub const DEFAULT_DENOM_REPR: &str = "ATOM";
pub const DEFAULT_DENOM_FACTOR: usize = 6;

/// Digest computed over the raw transaction bytes before signing
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum HashKind {
    Sha256,
    Keccak256,
}

/// Account address derivation scheme
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AddressKind {
    /// bech32(ripemd160(sha256(compressed public key)))
    Secp256k1Cosmos,
    /// bech32(keccak256(uncompressed public key)[12..])
    Secp256k1Eth,
}

/// Signing policy resolved from the chain table
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ChainConfig {
    pub hash: HashKind,
    pub address: AddressKind,
    /// Signing on this chain requires expert mode
    pub expert_sign_only: bool,
}

/// Chain lookup failure
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum ChainError {
    /// No configuration matches the submitted coin type / HRP pair
    #[cfg_attr(feature = "thiserror", error("chain config not supported"))]
    NotSupported,
}

const COSMOS_CONFIG: ChainConfig = ChainConfig {
    hash: HashKind::Sha256,
    address: AddressKind::Secp256k1Cosmos,
    expert_sign_only: false,
};

struct ChainEntry {
    coin_type: u32,
    hrp: &'static str,
    config: ChainConfig,
}

// To enable a new chain, add an entry with its coin type, hrp and policy
static CHAIN_TABLE: &[ChainEntry] = &[ChainEntry {
    coin_type: COIN_TYPE_EVM,
    hrp: "inj",
    config: ChainConfig {
        hash: HashKind::Keccak256,
        address: AddressKind::Secp256k1Eth,
        expert_sign_only: true,
    },
}];

/// Resolve the signing policy for a coin type / HRP pair
///
/// This check precedes all other validation: an unsupported pair fails the
/// operation regardless of path or transaction validity.
pub fn resolve(coin_type: u32, hrp: &str) -> Result<ChainConfig, ChainError> {
    // Always allowed for 118' (default Cosmos)
    if coin_type == COIN_TYPE_COSMOS {
        return Ok(COSMOS_CONFIG);
    }

    for entry in CHAIN_TABLE {
        if entry.coin_type == coin_type && entry.hrp == hrp {
            return Ok(entry.config);
        }
    }

    Err(ChainError::NotSupported)
}
