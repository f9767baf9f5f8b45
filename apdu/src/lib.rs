// Copyright (c) 2018-2024 Zondax AG

//! Protocol / APDU definitions for Cosmos-SDK hardware wallet communication
//!
//! This module provides a protocol specification and reference implementation
//! for communication with Cosmos-SDK signing devices.
//!
//! APDUs use a primitive binary encoding to simplify implementation with
//! unsupported languages and platforms. Multi-byte integer fields are
//! little-endian unless a field is documented otherwise; variable-length
//! fields are length-prefixed so frames can be parsed without lookahead.

#![no_std]

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod address;
pub mod path;
pub mod prelude;
pub mod sign;
pub mod state;
pub mod status;
pub mod version;

/// Cosmos APDU class
pub const COSM_APDU_CLA: u8 = 0x55;

/// Minimum viable frame length (CLA + INS + P1 + P2 + LEN)
pub const APDU_HEADER_LEN: usize = 5;

/// Cosmos APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version and mode flags
    GetVersion = 0x00,

    /// Initialise / continue / complete a signing operation
    Sign = 0x02,

    /// Fetch (or show and confirm) an address and public key
    GetAddress = 0x04,

    /// Poll the outcome of a pending user-facing operation
    GetOutcome = 0x06,
}
