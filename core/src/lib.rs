// Copyright (c) 2018-2024 Zondax AG

//! Cosmos hardware wallet signing core
//!
//! This provides a common [Engine][engine] implementing the device side of
//! the Cosmos-SDK signing protocol: chain configuration lookup, derivation
//! path policy, the two transaction codecs, review pagination, and the
//! approval state machine gating signature production on explicit user
//! consent.
//!
//! Interactions with the [Engine][engine] are performed via
//! [Event][engine::Event]s and [Output][engine::Output]s, see
//! [ledger_cosm_apdu] for APDU objects and wire encodings. The
//! [Dispatcher][dispatcher::Dispatcher] wraps the engine for transports that
//! deliver raw command frames.
//!
//! ## Operations
//!
//! - [`VersionReq`][ledger_cosm_apdu::version::VersionReq] returns the
//!   application version and mode flags.
//! - [`AddressReq`][ledger_cosm_apdu::address::AddressReq] resolves the chain
//!   configuration for the submitted HRP, validates the derivation path, and
//!   returns an [`AddressResp`][ledger_cosm_apdu::address::AddressResp] with
//!   the compressed public key and bech32 address, optionally gated on
//!   on-device confirmation.
//! - [`SignInit`][ledger_cosm_apdu::sign::SignInit] followed by
//!   sequence-indexed [`SignData`][ledger_cosm_apdu::sign::SignData] frames
//!   submits a transaction for review. Once accepted the engine answers with
//!   a pending state; the host collects the signature (or rejection) with
//!   [`OutcomeReq`][ledger_cosm_apdu::sign::OutcomeReq] after the user
//!   decides on-device.
//!
//! The platform integrates by implementing [`Driver`][engine::Driver] over
//! its secure-element key primitives and forwarding display/input callbacks
//! to the engine's review methods.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use ledger_cosm_apdu as apdu;

pub mod addr;
pub mod chain;
pub mod dispatcher;
pub mod engine;
pub mod path;
pub mod review;
pub mod tx;
