// Copyright (c) 2018-2024 Zondax AG

//! Address / public key APDUs

use encdec::{Decode, DecodeOwned, Encode};

use super::{
    path::{Bip32Path, PATH_BYTES},
    ApduError, ApduStatic, Instruction, COSM_APDU_CLA,
};

/// Compressed SEC1 public key length
pub const PK_LEN: usize = 33;

/// Maximum accepted HRP length (bech32 limit)
pub const MAX_HRP_LEN: usize = 83;

/// Address request APDU
///
/// Resolves the chain configuration for `hrp`, validates `path`, and returns
/// the derived public key and bech32 address. With `confirm` set the address
/// is first shown on-device and the response is gated on user approval.
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    CONFIRM    |    HRP_LEN    |            HRP...             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                       PATH (5 x u32 LE)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressReq<'a> {
    /// Require on-device confirmation before replying
    pub confirm: bool,

    /// Chain human-readable prefix
    pub hrp: &'a str,

    /// Derivation path
    pub path: Bip32Path,
}

impl<'a> AddressReq<'a> {
    /// Create a new address request APDU
    pub fn new(confirm: bool, hrp: &'a str, path: Bip32Path) -> Self {
        Self { confirm, hrp, path }
    }
}

impl<'a> ApduStatic for AddressReq<'a> {
    const CLA: u8 = COSM_APDU_CLA;
    const INS: u8 = Instruction::GetAddress as u8;
}

impl<'a> Encode for AddressReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + self.hrp.len() + PATH_BYTES)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if self.hrp.is_empty() || self.hrp.len() > MAX_HRP_LEN {
            return Err(ApduError::InvalidLength);
        }
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[0] = self.confirm as u8;
        buff[1] = self.hrp.len() as u8;
        index += 2;

        buff[index..][..self.hrp.len()].copy_from_slice(self.hrp.as_bytes());
        index += self.hrp.len();

        index += self.path.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl<'a> Decode<'a> for AddressReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        let confirm = buff[0] != 0;
        let hrp_len = buff[1] as usize;
        if hrp_len == 0 || hrp_len > MAX_HRP_LEN {
            return Err(ApduError::InvalidEncoding);
        }

        let mut index = 2;
        if buff.len() < index + hrp_len {
            return Err(ApduError::InvalidLength);
        }

        let hrp = core::str::from_utf8(&buff[index..][..hrp_len])
            .map_err(|_| ApduError::InvalidEncoding)?;
        index += hrp_len;

        let (path, n) = Bip32Path::decode_owned(&buff[index..])?;
        index += n;

        Ok((Self { confirm, hrp, path }, index))
    }
}

/// Address response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                 COMPRESSED_PUBLIC_KEY (33 bytes)              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   ADDR_LEN    |                 ADDRESS...                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AddressResp<'a> {
    /// Compressed SEC1 public key
    pub public_key: [u8; PK_LEN],

    /// Bech32 account address
    pub address: &'a str,
}

impl<'a> AddressResp<'a> {
    /// Create a new address response APDU
    pub fn new(public_key: [u8; PK_LEN], address: &'a str) -> Self {
        Self {
            public_key,
            address,
        }
    }
}

impl<'a> Encode for AddressResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(PK_LEN + 1 + self.address.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[..PK_LEN].copy_from_slice(&self.public_key);
        index += PK_LEN;

        buff[index] = self.address.len() as u8;
        index += 1;

        buff[index..][..self.address.len()].copy_from_slice(self.address.as_bytes());
        index += self.address.len();

        Ok(index)
    }
}

impl<'a> Decode<'a> for AddressResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < PK_LEN + 1 {
            return Err(ApduError::InvalidLength);
        }

        let mut public_key = [0u8; PK_LEN];
        public_key.copy_from_slice(&buff[..PK_LEN]);

        let addr_len = buff[PK_LEN] as usize;
        let mut index = PK_LEN + 1;

        if buff.len() < index + addr_len {
            return Err(ApduError::InvalidLength);
        }

        let address = core::str::from_utf8(&buff[index..][..addr_len])
            .map_err(|_| ApduError::InvalidEncoding)?;
        index += addr_len;

        Ok((
            Self {
                public_key,
                address,
            },
            index,
        ))
    }
}
