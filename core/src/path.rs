// Copyright (c) 2018-2024 Zondax AG

//! Derivation path validation
//!
//! Paths are fixed at five components. The purpose, coin type and change
//! components are checked structurally; the account, change and address
//! index components are additionally bounded in normal mode, where values
//! above the consumer range require expert mode to be accepted.

use ledger_cosm_apdu::path::{Bip32Path, HARDENED};

use crate::chain::{COIN_TYPE_COSMOS, COIN_TYPE_EVM};

/// BIP-44 purpose component (hardened)
pub const PURPOSE: u32 = 44 | HARDENED;

// Hardened or unhardened component values above this require expert mode
const UNUSUAL_VALUE_CEILING: u32 = 100;

/// Path validation failure
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum PathError {
    /// Purpose, coin type or change component out of policy
    #[cfg_attr(feature = "thiserror", error("invalid HD path coin value"))]
    InvalidCoin,

    /// Component above the normal-mode ceiling without expert mode
    #[cfg_attr(
        feature = "thiserror",
        error("invalid HD path value, expert mode required")
    )]
    ExpertRequired,
}

/// Validate a derivation path against the device policy
pub fn validate(path: &Bip32Path, expert: bool) -> Result<(), PathError> {
    let c = path.components();

    if c[0] != PURPOSE {
        return Err(PathError::InvalidCoin);
    }
    if c[1] != COIN_TYPE_COSMOS && c[1] != COIN_TYPE_EVM {
        return Err(PathError::InvalidCoin);
    }
    if c[3] != 0 {
        return Err(PathError::InvalidCoin);
    }

    // Limit values unless the app is running in expert mode
    if !expert {
        for i in 2..5 {
            if path.unhardened(i) > UNUSUAL_VALUE_CEILING {
                return Err(PathError::ExpertRequired);
            }
        }
    }

    Ok(())
}
