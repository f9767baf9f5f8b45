// Copyright (c) 2018-2024 Zondax AG

//! Signing APDUs
//!
//! A signing operation is submitted as an init frame carrying the derivation
//! path, HRP and payload encoding, followed by one or more sequence-indexed
//! data frames. The final frame is tagged `Last`; once accepted the engine
//! moves to transaction review and the host polls for the outcome with
//! [`OutcomeReq`].

use encdec::{Decode, DecodeOwned, Encode};

use super::{
    address::MAX_HRP_LEN,
    path::{Bip32Path, PATH_BYTES},
    ApduError, ApduStatic, Instruction, COSM_APDU_CLA,
};

/// Maximum DER-encoded ECDSA signature length
pub const MAX_DER_SIG_LEN: usize = 72;

/// Transaction payload encodings
#[derive(Copy, Clone, PartialEq, Debug, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Encoding {
    /// Order-preserving structured text (sign-doc JSON)
    Json = 0x00,
    /// Self-describing binary screen list (SIGN_MODE_TEXTUAL)
    Textual = 0x01,
}

/// Sign payload frame kinds, first byte of every sign frame
#[derive(Copy, Clone, PartialEq, Debug, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum PayloadKind {
    Init = 0x00,
    Add = 0x01,
    Last = 0x02,
}

/// Sign init frame
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  KIND (0x00)  |   ENCODING    |    HRP_LEN    |     HRP...    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                       PATH (5 x u32 LE)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignInit<'a> {
    /// Payload encoding for the frames that follow
    pub encoding: Encoding,

    /// Chain human-readable prefix
    pub hrp: &'a str,

    /// Signing path
    pub path: Bip32Path,
}

impl<'a> SignInit<'a> {
    /// Create a new sign init APDU
    pub fn new(encoding: Encoding, hrp: &'a str, path: Bip32Path) -> Self {
        Self {
            encoding,
            hrp,
            path,
        }
    }
}

impl<'a> ApduStatic for SignInit<'a> {
    const CLA: u8 = COSM_APDU_CLA;
    const INS: u8 = Instruction::Sign as u8;
}

impl<'a> Encode for SignInit<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(3 + self.hrp.len() + PATH_BYTES)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if self.hrp.is_empty() || self.hrp.len() > MAX_HRP_LEN {
            return Err(ApduError::InvalidLength);
        }
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        buff[0] = PayloadKind::Init as u8;
        buff[1] = self.encoding as u8;
        buff[2] = self.hrp.len() as u8;
        index += 3;

        buff[index..][..self.hrp.len()].copy_from_slice(self.hrp.as_bytes());
        index += self.hrp.len();

        index += self.path.encode(&mut buff[index..])?;

        Ok(index)
    }
}

impl<'a> Decode<'a> for SignInit<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 3 {
            return Err(ApduError::InvalidLength);
        }
        if buff[0] != PayloadKind::Init as u8 {
            return Err(ApduError::InvalidEncoding);
        }

        let encoding = Encoding::try_from(buff[1]).map_err(|_| ApduError::InvalidEncoding)?;

        let hrp_len = buff[2] as usize;
        if hrp_len == 0 || hrp_len > MAX_HRP_LEN {
            return Err(ApduError::InvalidEncoding);
        }

        let mut index = 3;
        if buff.len() < index + hrp_len {
            return Err(ApduError::InvalidLength);
        }

        let hrp = core::str::from_utf8(&buff[index..][..hrp_len])
            .map_err(|_| ApduError::InvalidEncoding)?;
        index += hrp_len;

        let (path, n) = Bip32Path::decode_owned(&buff[index..])?;
        index += n;

        Ok((
            Self {
                encoding,
                hrp,
                path,
            },
            index,
        ))
    }
}

/// Sign data frame (`Add` or `Last`)
///
/// ## Encoding
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     KIND      |      SEQ      |    DATA...    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignData<'a> {
    /// Frame kind: [`PayloadKind::Add`] or [`PayloadKind::Last`]
    pub kind: PayloadKind,

    /// Chunk sequence index, starting at 1 for the first data frame
    pub seq: u8,

    /// Raw transaction bytes
    pub data: &'a [u8],
}

impl<'a> SignData<'a> {
    /// Create an intermediate data frame
    pub fn add(seq: u8, data: &'a [u8]) -> Self {
        Self {
            kind: PayloadKind::Add,
            seq,
            data,
        }
    }

    /// Create the final data frame
    pub fn last(seq: u8, data: &'a [u8]) -> Self {
        Self {
            kind: PayloadKind::Last,
            seq,
            data,
        }
    }
}

impl<'a> ApduStatic for SignData<'a> {
    const CLA: u8 = COSM_APDU_CLA;
    const INS: u8 = Instruction::Sign as u8;
}

impl<'a> Encode for SignData<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.kind as u8;
        buff[1] = self.seq;
        buff[2..][..self.data.len()].copy_from_slice(self.data);

        Ok(2 + self.data.len())
    }
}

impl<'a> Decode<'a> for SignData<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        let kind = match PayloadKind::try_from(buff[0]) {
            Ok(PayloadKind::Add) => PayloadKind::Add,
            Ok(PayloadKind::Last) => PayloadKind::Last,
            _ => return Err(ApduError::InvalidEncoding),
        };

        Ok((
            Self {
                kind,
                seq: buff[1],
                data: &buff[2..],
            },
            buff.len(),
        ))
    }
}

/// Outcome poll request APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct OutcomeReq {}

impl ApduStatic for OutcomeReq {
    const CLA: u8 = COSM_APDU_CLA;
    const INS: u8 = Instruction::GetOutcome as u8;
}

impl Encode for OutcomeReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl DecodeOwned for OutcomeReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        Ok((Self {}, 0))
    }
}

/// Signature response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    SIG_LEN    |       DER_SIGNATURE...        /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignResp<'a> {
    /// DER-encoded ECDSA signature
    pub signature: &'a [u8],
}

impl<'a> SignResp<'a> {
    /// Create a new signature response APDU
    pub fn new(signature: &'a [u8]) -> Self {
        Self { signature }
    }
}

impl<'a> Encode for SignResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + self.signature.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if self.signature.len() > MAX_DER_SIG_LEN {
            return Err(ApduError::InvalidLength);
        }
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.signature.len() as u8;
        buff[1..][..self.signature.len()].copy_from_slice(self.signature);

        Ok(1 + self.signature.len())
    }
}

impl<'a> Decode<'a> for SignResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let sig_len = buff[0] as usize;
        if sig_len > MAX_DER_SIG_LEN || buff.len() < 1 + sig_len {
            return Err(ApduError::InvalidLength);
        }

        Ok((
            Self {
                signature: &buff[1..][..sig_len],
            },
            1 + sig_len,
        ))
    }
}
