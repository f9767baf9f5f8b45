// Copyright (c) 2018-2024 Zondax AG

//! Application state APDUs
//!
//! [`TxState`] communicates engine progress to the host while an operation
//! is pending, and [`StateResp`] carries it with review progress attached.

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString};

use super::ApduError;

/// Engine state enumeration, used in [`StateResp`] to communicate
/// operation progress to the host
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum TxState {
    /// No operation in flight
    Idle = 0x00,
    /// Address confirmation pending user approval
    AddressReview = 0x10,
    /// Transaction review pending user approval
    TxReview = 0x20,
    /// Terminal: operation approved, outcome available
    Approved = 0x30,
    /// Terminal: operation rejected by the user
    Rejected = 0x31,
    /// Terminal: operation failed
    Error = 0xFF,
}

impl Encode for TxState {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = *self as u8;
        Ok(1)
    }
}

impl DecodeOwned for TxState {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        match Self::try_from(buff[0]) {
            Ok(v) => Ok((v, 1)),
            Err(_) => Err(ApduError::InvalidEncoding),
        }
    }
}

/// Pending-state response APDU
///
/// Returned while an operation awaits user input, carrying review progress
/// so the host can mirror "screen k of N".
///
/// ## Encoding
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     STATE     |    SCREEN     |   NUM_SCREENS |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct StateResp {
    /// Current engine state
    pub state: TxState,
    /// Zero-based index of the screen currently shown
    pub screen: u8,
    /// Total screen count for the active review (zero outside review)
    pub num_screens: u8,
}

impl StateResp {
    /// Create a new state response APDU
    pub fn new(state: TxState, screen: u8, num_screens: u8) -> Self {
        Self {
            state,
            screen,
            num_screens,
        }
    }
}

impl Encode for StateResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(3)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < 3 {
            return Err(ApduError::InvalidLength);
        }

        self.state.encode(buff)?;
        buff[1] = self.screen;
        buff[2] = self.num_screens;

        Ok(3)
    }
}

impl DecodeOwned for StateResp {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < 3 {
            return Err(ApduError::InvalidLength);
        }

        let (state, _) = TxState::decode_owned(buff)?;

        Ok((
            Self {
                state,
                screen: buff[1],
                num_screens: buff[2],
            },
            3,
        ))
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn tx_state_round_trip() {
        for state in TxState::iter() {
            let mut buff = [0u8; 4];
            state.encode(&mut buff).unwrap();

            let (decoded, _) = TxState::decode_owned(&buff).unwrap();
            assert_eq!(decoded, state);
        }
    }

    #[test]
    fn state_resp_apdu() {
        let apdu = StateResp::new(TxState::TxReview, 3, 11);

        let mut buff = [0u8; 16];
        encode_decode_apdu(&mut buff, &apdu);
    }

    #[test]
    fn tx_state_rejects_unknown() {
        let buff = [0x77u8];
        assert!(TxState::decode_owned(&buff).is_err());
    }
}
