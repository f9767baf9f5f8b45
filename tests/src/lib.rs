// Copyright (c) 2018-2024 Zondax AG

//! Test suites for Cosmos wallet integration.
//!
//! Generic over [Transport] for reuse: the same suites drive the engine
//! in-process (see the core crate's integration tests) or a device behind
//! any frame transport.

pub mod address;

pub mod sign;

pub mod vectors;

use ledger_cosm_apdu::{Instruction, APDU_HEADER_LEN, COSM_APDU_CLA};

/// Raw frame transport to the device under test
///
/// Responses are returned as (payload, status word) so suites can assert
/// error paths, not just decoded successes.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Submit one command frame, returning the response payload and status
    fn exchange(&mut self, frame: &[u8]) -> Result<(Vec<u8>, u16), Self::Error>;

    /// Drive on-device approval of the pending operation
    fn approve(&mut self);

    /// Drive on-device rejection of the pending operation
    fn reject(&mut self);
}

/// Status word for a completed operation
pub const SW_OK: u16 = 0x9000;

/// Build a command frame around an APDU payload
pub fn build_frame(ins: Instruction, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= u8::MAX as usize, "payload exceeds one frame");

    let mut frame = Vec::with_capacity(APDU_HEADER_LEN + payload.len());
    frame.extend_from_slice(&[COSM_APDU_CLA, ins as u8, 0, 0, payload.len() as u8]);
    frame.extend_from_slice(payload);
    frame
}

/// Exchange an encodable APDU, asserting on transport failure
pub fn exchange_apdu<T, A>(t: &mut T, ins: Instruction, apdu: &A) -> (Vec<u8>, u16)
where
    T: Transport,
    A: encdec::Encode<Error = ledger_cosm_apdu::ApduError>,
{
    let mut payload = [0u8; 256];
    let n = apdu.encode(&mut payload).expect("APDU encode failed");

    let frame = build_frame(ins, &payload[..n]);
    t.exchange(&frame).expect("transport failure")
}

/// Exchange a bare (payload-free) instruction
pub fn exchange_empty<T: Transport>(t: &mut T, ins: Instruction) -> (Vec<u8>, u16) {
    let frame = build_frame(ins, &[]);
    t.exchange(&frame).expect("transport failure")
}
