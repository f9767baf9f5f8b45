// Copyright (c) 2018-2024 Zondax AG

//! Application version APDUs

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, COSM_APDU_CLA};

/// Fetch application version APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq {}

impl ApduStatic for VersionReq {
    const CLA: u8 = COSM_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for VersionReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

impl DecodeOwned for VersionReq {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(_buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        Ok((Self {}, 0))
    }
}

/// Application version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TEST_MODE   |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    LOCKED     |                  TARGET_ID                    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  TARGET_ID    |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct VersionResp {
    /// Set when the app was built in test mode
    pub test_mode: bool,

    /// Application version triple
    pub major: u8,
    pub minor: u8,
    pub patch: u8,

    /// Device lock state, always false while the app can answer APDUs
    pub locked: bool,

    /// Device target identifier (big-endian, SDK convention)
    pub target_id: u32,
}

impl VersionResp {
    /// Create a new version response APDU
    pub fn new(test_mode: bool, major: u8, minor: u8, patch: u8, target_id: u32) -> Self {
        Self {
            test_mode,
            major,
            minor,
            patch,
            locked: false,
            target_id,
        }
    }
}

impl Encode for VersionResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(9)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < 9 {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.test_mode as u8;
        buff[1] = self.major;
        buff[2] = self.minor;
        buff[3] = self.patch;
        buff[4] = self.locked as u8;
        buff[5..9].copy_from_slice(&self.target_id.to_be_bytes());

        Ok(9)
    }
}

impl DecodeOwned for VersionResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 9 {
            return Err(ApduError::InvalidLength);
        }

        let mut target_id = [0u8; 4];
        target_id.copy_from_slice(&buff[5..9]);

        Ok((
            Self {
                test_mode: buff[0] != 0,
                major: buff[1],
                minor: buff[2],
                patch: buff[3],
                locked: buff[4] != 0,
                target_id: u32::from_be_bytes(target_id),
            },
            9,
        ))
    }
}
