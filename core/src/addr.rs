// Copyright (c) 2018-2024 Zondax AG

//! Account address derivation
//!
//! Derives the bech32 account address from the driver-provided public key
//! according to the resolved chain policy: Cosmos chains hash the compressed
//! key with SHA-256 then RIPEMD-160, Ethereum-scheme chains take the last 20
//! bytes of the Keccak-256 of the uncompressed key body.

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest as _, Sha256};
use sha3::Keccak256;

use crate::chain::{AddressKind, ChainConfig};

/// Maximum bech32 address length (83-char HRP + separator + data + checksum)
pub const MAX_ADDR_LEN: usize = 128;

/// Uncompressed SEC1 public key length
pub const PK_UNCOMPRESSED_LEN: usize = 65;

/// Rendered address buffer
pub type AddressString = heapless::String<MAX_ADDR_LEN>;

/// Address derivation failure
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum AddrError {
    /// Public key is not a valid uncompressed SEC1 encoding
    #[cfg_attr(feature = "thiserror", error("invalid public key"))]
    InvalidKey,

    /// HRP rejected by the bech32 encoder or address over capacity
    #[cfg_attr(feature = "thiserror", error("address encoding failed"))]
    Encoding,
}

/// Compress an uncompressed SEC1 public key in place
pub fn compress_public_key(
    uncompressed: &[u8; PK_UNCOMPRESSED_LEN],
) -> Result<[u8; 33], AddrError> {
    if uncompressed[0] != 0x04 {
        return Err(AddrError::InvalidKey);
    }

    let mut out = [0u8; 33];
    out[1..].copy_from_slice(&uncompressed[1..33]);
    out[0] = if uncompressed[64] & 1 != 0 { 0x03 } else { 0x02 };

    Ok(out)
}

/// Derive the compressed public key and bech32 address for a chain policy
pub fn derive(
    config: &ChainConfig,
    hrp: &str,
    uncompressed: &[u8; PK_UNCOMPRESSED_LEN],
) -> Result<([u8; 33], AddressString), AddrError> {
    let compressed = compress_public_key(uncompressed)?;

    let hrp = Hrp::parse(hrp).map_err(|_| AddrError::Encoding)?;

    let encoded = match config.address {
        AddressKind::Secp256k1Cosmos => {
            let sha = Sha256::digest(compressed);
            let rip = Ripemd160::digest(sha);
            bech32::encode::<Bech32>(hrp, &rip).map_err(|_| AddrError::Encoding)?
        }
        AddressKind::Secp256k1Eth => {
            let keccak = Keccak256::digest(&uncompressed[1..]);
            bech32::encode::<Bech32>(hrp, &keccak[12..]).map_err(|_| AddrError::Encoding)?
        }
    };

    let mut address = AddressString::new();
    address
        .push_str(encoded.as_str())
        .map_err(|_| AddrError::Encoding)?;

    Ok((compressed, address))
}
