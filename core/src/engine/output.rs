// Copyright (c) 2018-2024 Zondax AG

//! [Engine][super::Engine] outputs, encoded to response APDUs

use encdec::Encode;

use ledger_cosm_apdu::{
    address::AddressResp,
    sign::{SignResp, MAX_DER_SIG_LEN},
    state::{StateResp, TxState},
    version::VersionResp,
    ApduError,
};

use crate::addr::AddressString;

/// Engine outputs (in response to events), typically encoded to response APDUs
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Nothing to report beyond the status word
    None,

    /// Application version and flags
    Version {
        test_mode: bool,
        major: u8,
        minor: u8,
        patch: u8,
        target_id: u32,
    },

    /// Current engine state with review progress
    State {
        state: TxState,
        screen: u8,
        num_screens: u8,
    },

    /// Derived address and public key
    Address {
        public_key: [u8; 33],
        address: AddressString,
    },

    /// DER-encoded transaction signature
    Signature {
        signature: heapless::Vec<u8, MAX_DER_SIG_LEN>,
    },
}

impl Output {
    /// Encode an [`Output`] to a response APDU payload
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None => Ok(0),
            Output::Version {
                test_mode,
                major,
                minor,
                patch,
                target_id,
            } => VersionResp::new(*test_mode, *major, *minor, *patch, *target_id).encode(buff),
            Output::State {
                state,
                screen,
                num_screens,
            } => StateResp::new(*state, *screen, *num_screens).encode(buff),
            Output::Address {
                public_key,
                address,
            } => AddressResp::new(*public_key, address.as_str()).encode(buff),
            Output::Signature { signature } => SignResp::new(signature.as_slice()).encode(buff),
        }
    }

    /// Fetch state for outputs carrying it
    pub fn state(&self) -> Option<TxState> {
        match self {
            Output::State { state, .. } => Some(*state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use encdec::Decode;

    use super::*;

    #[test]
    fn encode_state_output() {
        let out = Output::State {
            state: TxState::TxReview,
            screen: 2,
            num_screens: 9,
        };

        let mut buff = [0u8; 16];
        let n = out.encode(&mut buff).unwrap();

        let (resp, _) = StateResp::decode(&buff[..n]).unwrap();
        assert_eq!(resp.state, TxState::TxReview);
        assert_eq!(resp.screen, 2);
        assert_eq!(resp.num_screens, 9);
    }

    #[test]
    fn encode_signature_output() {
        let sig = heapless::Vec::from_slice(&[0x30u8; 70]).unwrap();
        let out = Output::Signature { signature: sig };

        let mut buff = [0u8; 128];
        let n = out.encode(&mut buff).unwrap();

        let (resp, _) = SignResp::decode(&buff[..n]).unwrap();
        assert_eq!(resp.signature.len(), 70);
    }

    #[test]
    fn none_output_is_empty() {
        let mut buff = [0u8; 4];
        assert_eq!(Output::None.encode(&mut buff).unwrap(), 0);
    }
}
