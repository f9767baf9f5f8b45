// Copyright (c) 2018-2024 Zondax AG

//! Signing test suites

use anyhow::{anyhow, ensure, Result};

use bitcoin::secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
use encdec::Decode;
use sha2::{Digest as _, Sha256};
use sha3::Keccak256;

use ledger_cosm_apdu::{
    path::Bip32Path,
    sign::{Encoding, SignData, SignInit, SignResp},
    Instruction,
};

use crate::{address, exchange_apdu, exchange_empty, Transport, SW_OK};

/// Digest the suites verify against, selected by path policy
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum TxHash {
    Sha256,
    Keccak256,
}

impl TxHash {
    pub fn digest(&self, tx: &[u8]) -> [u8; 32] {
        match self {
            TxHash::Sha256 => Sha256::digest(tx).into(),
            TxHash::Keccak256 => Keccak256::digest(tx).into(),
        }
    }
}

/// Maximum payload bytes per data frame
const CHUNK_LEN: usize = 230;

/// Submit a signing request, chunking the payload, and return the status of
/// the final frame
pub fn submit<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    encoding: Encoding,
    tx: &[u8],
) -> Result<u16> {
    let init = SignInit::new(encoding, hrp, path);
    let (_, sw) = exchange_apdu(t, Instruction::Sign, &init);
    if sw != SW_OK {
        return Ok(sw);
    }

    let chunks: Vec<&[u8]> = tx.chunks(CHUNK_LEN).collect();
    for (i, chunk) in chunks.iter().enumerate() {
        let seq = (i + 1) as u8;
        let frame = if i + 1 == chunks.len() {
            SignData::last(seq, chunk)
        } else {
            SignData::add(seq, chunk)
        };

        let (_, sw) = exchange_apdu(t, Instruction::Sign, &frame);
        if sw != SW_OK {
            return Ok(sw);
        }
    }

    Ok(SW_OK)
}

/// Collect the signature after approval
pub fn collect_signature<T: Transport>(t: &mut T) -> Result<Vec<u8>> {
    let (payload, sw) = exchange_empty(t, Instruction::GetOutcome);
    ensure!(sw == SW_OK, "outcome poll failed with 0x{sw:04X}");

    let (resp, _) = SignResp::decode(&payload).map_err(|e| anyhow!("decode: {e:?}"))?;
    Ok(resp.signature.to_vec())
}

/// Verify a DER signature over `tx` against a compressed public key
pub fn verify(tx: &[u8], hash: TxHash, der: &[u8], compressed_pk: &[u8; 33]) -> Result<()> {
    let secp = Secp256k1::verification_only();

    let pk = PublicKey::from_slice(compressed_pk)?;
    let sig = Signature::from_der(der)?;
    let msg = Message::from_digest_slice(&hash.digest(tx))?;

    secp.verify_ecdsa(&msg, &sig, &pk)
        .map_err(|e| anyhow!("signature verification failed: {e}"))
}

/// Full happy path: submit, approve on the last screen, verify the
/// signature against the device's own public key
pub fn test_sign_and_verify<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    encoding: Encoding,
    tx: &[u8],
    hash: TxHash,
) -> Result<()> {
    let (pk, _) = address::get_address(t, hrp, path)?;

    // Fire the signing request; the outcome is collected separately
    let sw = submit(t, hrp, path, encoding, tx)?;
    ensure!(sw == SW_OK, "submit failed with 0x{sw:04X}");

    t.approve();
    let sig = collect_signature(t)?;

    verify(tx, hash, &sig, &pk)?;

    // Same bytes, same approval: the signature verifies under the same key
    let sw = submit(t, hrp, path, encoding, tx)?;
    ensure!(sw == SW_OK, "resubmit failed with 0x{sw:04X}");
    t.approve();
    let sig2 = collect_signature(t)?;
    verify(tx, hash, &sig2, &pk)?;

    Ok(())
}

/// Rejection produces no signature and replays on every poll
pub fn test_rejection_idempotent<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    encoding: Encoding,
    tx: &[u8],
    expected_sw: u16,
) -> Result<()> {
    let sw = submit(t, hrp, path, encoding, tx)?;
    ensure!(sw == SW_OK, "submit failed with 0x{sw:04X}");

    t.reject();

    for _ in 0..3 {
        let (_, sw) = exchange_empty(t, Instruction::GetOutcome);
        ensure!(
            sw == expected_sw,
            "expected rejection 0x{expected_sw:04X}, got 0x{sw:04X}"
        );
    }

    Ok(())
}

/// Submission fails with the expected status before any review is shown
pub fn test_submit_fails<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    encoding: Encoding,
    tx: &[u8],
    expected_sw: u16,
) -> Result<()> {
    let sw = submit(t, hrp, path, encoding, tx)?;
    ensure!(sw == expected_sw, "expected 0x{expected_sw:04X}, got 0x{sw:04X}");
    Ok(())
}
