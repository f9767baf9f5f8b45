// Copyright (c) 2018-2024 Zondax AG

//! [Engine][super::Engine] errors

use crate::{addr::AddrError, chain::ChainError, path::PathError, tx::ParserError};

/// Engine error
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("invalid argument length"))]
    InvalidLength,

    /// Event not valid in the current state
    #[cfg_attr(feature = "thiserror", error("unexpected event"))]
    UnexpectedEvent,

    /// A user-facing operation is already in flight
    #[cfg_attr(feature = "thiserror", error("operation in progress"))]
    Busy,

    /// No chain configuration for the submitted HRP / coin type
    #[cfg_attr(feature = "thiserror", error("chain config not supported"))]
    ChainNotSupported,

    /// Path purpose, coin type or change component out of policy
    #[cfg_attr(feature = "thiserror", error("invalid HD path coin value"))]
    InvalidPathCoin,

    /// Path component above the normal-mode ceiling
    #[cfg_attr(
        feature = "thiserror",
        error("invalid HD path value, expert mode required")
    )]
    InvalidPathValue,

    /// Chain policy restricts signing to expert mode
    #[cfg_attr(feature = "thiserror", error("expert mode required"))]
    ExpertRequired,

    /// Transaction decode failure
    #[cfg_attr(feature = "thiserror", error("decode failed: {0:?}"))]
    Parser(ParserError),

    /// Sign payload chunk out of sequence
    #[cfg_attr(feature = "thiserror", error("payload chunk out of order"))]
    ChunkOutOfOrder,

    /// Transaction data exceeds the accumulation buffer
    #[cfg_attr(feature = "thiserror", error("transaction buffer full"))]
    BufferFull,

    /// User rejected the transaction on-device
    #[cfg_attr(feature = "thiserror", error("transaction rejected by user"))]
    UserRejected,

    /// User rejected the address on-device
    #[cfg_attr(feature = "thiserror", error("address rejected by user"))]
    AddressRejected,

    /// Public key derivation failed
    #[cfg_attr(feature = "thiserror", error("invalid key"))]
    InvalidKey,

    /// Signing primitive failed
    #[cfg_attr(feature = "thiserror", error("signing error"))]
    SignError,

    /// Response does not fit the output buffer
    #[cfg_attr(feature = "thiserror", error("output buffer too small"))]
    OutputTooSmall,
}

impl From<ChainError> for Error {
    fn from(_: ChainError) -> Self {
        Error::ChainNotSupported
    }
}

impl From<PathError> for Error {
    fn from(e: PathError) -> Self {
        match e {
            PathError::InvalidCoin => Error::InvalidPathCoin,
            PathError::ExpertRequired => Error::InvalidPathValue,
        }
    }
}

impl From<ParserError> for Error {
    fn from(e: ParserError) -> Self {
        Error::Parser(e)
    }
}

impl From<AddrError> for Error {
    fn from(e: AddrError) -> Self {
        match e {
            AddrError::InvalidKey => Error::InvalidKey,
            AddrError::Encoding => Error::InvalidKey,
        }
    }
}
