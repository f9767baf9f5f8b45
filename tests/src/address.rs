// Copyright (c) 2018-2024 Zondax AG

//! Address / public key test suites

use anyhow::{anyhow, ensure, Result};

use bech32::{primitives::decode::CheckedHrpstring, Bech32};
use encdec::Decode;
use ripemd::Ripemd160;
use sha2::{Digest as _, Sha256};

use ledger_cosm_apdu::{
    address::{AddressReq, AddressResp},
    path::Bip32Path,
    Instruction,
};

use crate::{exchange_apdu, exchange_empty, Transport, SW_OK};

/// Fetch an address without confirmation, asserting success
pub fn get_address<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
) -> Result<([u8; 33], String)> {
    let req = AddressReq::new(false, hrp, path);
    let (payload, sw) = exchange_apdu(t, Instruction::GetAddress, &req);
    ensure!(sw == SW_OK, "get_address failed with 0x{sw:04X}");

    let (resp, _) = AddressResp::decode(&payload).map_err(|e| anyhow!("decode: {e:?}"))?;
    Ok((resp.public_key, resp.address.to_string()))
}

/// Show an address with on-device confirmation, returning the final status
pub fn show_address<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    accept: bool,
) -> Result<(u16, Option<([u8; 33], String)>)> {
    let req = AddressReq::new(true, hrp, path);
    let (_, sw) = exchange_apdu(t, Instruction::GetAddress, &req);
    if sw != SW_OK {
        return Ok((sw, None));
    }

    if accept {
        t.approve();
    } else {
        t.reject();
    }

    let (payload, sw) = exchange_empty(t, Instruction::GetOutcome);
    if sw != SW_OK {
        return Ok((sw, None));
    }

    let (resp, _) = AddressResp::decode(&payload).map_err(|e| anyhow!("decode: {e:?}"))?;
    Ok((sw, Some((resp.public_key, resp.address.to_string()))))
}

/// Independent oracle: recompute the Cosmos account address from the
/// returned public key
pub fn cosmos_address_for(hrp: &str, public_key: &[u8; 33]) -> Result<String> {
    let sha = Sha256::digest(public_key);
    let rip = Ripemd160::digest(sha);

    let hrp = bech32::Hrp::parse(hrp)?;
    Ok(bech32::encode::<Bech32>(hrp, &rip)?)
}

/// Decode a bech32 address, returning (hrp, data)
pub fn decode_bech32(addr: &str) -> Result<(String, Vec<u8>)> {
    let parsed =
        CheckedHrpstring::new::<Bech32>(addr).map_err(|e| anyhow!("bech32 decode: {e:?}"))?;
    let hrp = parsed.hrp().to_string();
    let data = parsed.byte_iter().collect();
    Ok((hrp, data))
}

/// Address requests are deterministic and get/show agree
pub fn test_determinism<T: Transport>(t: &mut T, hrp: &str, path: Bip32Path) -> Result<()> {
    let (pk1, addr1) = get_address(t, hrp, path)?;
    let (pk2, addr2) = get_address(t, hrp, path)?;

    ensure!(pk1 == pk2, "public key differs between calls");
    ensure!(addr1 == addr2, "address differs between calls");

    let (sw, confirmed) = show_address(t, hrp, path, true)?;
    ensure!(sw == SW_OK, "show_address failed with 0x{sw:04X}");
    let (pk3, addr3) = confirmed.ok_or_else(|| anyhow!("missing confirmed address"))?;

    ensure!(pk1 == pk3, "get/show public key mismatch");
    ensure!(addr1 == addr3, "get/show address mismatch");

    // The address is the hash of the returned key, bech32-encoded
    ensure!(
        cosmos_address_for(hrp, &pk1)? == addr1,
        "address does not match its public key"
    );

    let (decoded_hrp, data) = decode_bech32(&addr1)?;
    ensure!(decoded_hrp == hrp, "address HRP mismatch");
    ensure!(data.len() == 20, "address payload must be 20 bytes");

    Ok(())
}

/// Operations on an unsupported chain fail up front with the chain status
pub fn test_chain_not_supported<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    expected_sw: u16,
) -> Result<()> {
    let req = AddressReq::new(false, hrp, path);
    let (_, sw) = exchange_apdu(t, Instruction::GetAddress, &req);
    ensure!(sw == expected_sw, "expected 0x{expected_sw:04X}, got 0x{sw:04X}");

    let (sw, _) = show_address(t, hrp, path, true)?;
    ensure!(sw == expected_sw, "expected 0x{expected_sw:04X}, got 0x{sw:04X}");

    Ok(())
}

/// A path above the consumer range is gated on expert mode
pub fn test_huge_path_requires_expert<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    expected_sw: u16,
    set_expert: impl Fn(&mut T, bool),
) -> Result<()> {
    set_expert(t, false);
    let (sw, _) = show_address(t, hrp, path, true)?;
    ensure!(
        sw == expected_sw,
        "expected 0x{expected_sw:04X} without expert mode, got 0x{sw:04X}"
    );

    set_expert(t, true);
    let (sw, confirmed) = show_address(t, hrp, path, true)?;
    ensure!(sw == SW_OK, "expert-mode request failed with 0x{sw:04X}");
    let (pk, addr) = confirmed.ok_or_else(|| anyhow!("missing confirmed address"))?;

    // Deterministic result for the huge path too
    set_expert(t, true);
    let (sw2, confirmed2) = show_address(t, hrp, path, true)?;
    ensure!(sw2 == SW_OK, "repeat request failed with 0x{sw2:04X}");
    ensure!(
        confirmed2 == Some((pk, addr)),
        "huge-path address not reproducible"
    );

    set_expert(t, false);
    Ok(())
}

/// Rejecting the address on-device yields the data-invalid status
pub fn test_user_rejection<T: Transport>(
    t: &mut T,
    hrp: &str,
    path: Bip32Path,
    expected_sw: u16,
) -> Result<()> {
    let (sw, resp) = show_address(t, hrp, path, false)?;
    ensure!(sw == expected_sw, "expected 0x{expected_sw:04X}, got 0x{sw:04X}");
    ensure!(resp.is_none(), "rejection must not return an address");

    // The terminal outcome replays on repeated polls
    let (_, sw) = exchange_empty(t, Instruction::GetOutcome);
    ensure!(sw == expected_sw, "rejection outcome not idempotent");

    Ok(())
}
