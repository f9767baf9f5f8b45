// Copyright (c) 2018-2024 Zondax AG

//! [Engine][super::Engine] input events, decoded from request APDUs

use encdec::Decode;

use ledger_cosm_apdu::{
    address::AddressReq,
    path::Bip32Path,
    sign::{Encoding, OutcomeReq, PayloadKind, SignData, SignInit},
    version::VersionReq,
    ApduError, ApduStatic,
};

/// Engine input events, typically decoded from request APDUs
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    /// Fetch application version / flags
    GetVersion,

    /// Fetch (and optionally confirm on-device) an address and public key
    GetAddress {
        path: Bip32Path,
        hrp: &'a str,
        confirm: bool,
    },

    /// Start a signing operation
    SignInit {
        path: Bip32Path,
        hrp: &'a str,
        encoding: Encoding,
    },

    /// Append transaction bytes; `last` closes the accumulation
    SignData {
        seq: u8,
        data: &'a [u8],
        last: bool,
    },

    /// Poll the outcome of the pending operation
    GetOutcome,
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU payload to an engine event
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, ApduError> {
        match ins {
            VersionReq::INS => Ok(Event::GetVersion),
            OutcomeReq::INS => Ok(Event::GetOutcome),
            AddressReq::INS => AddressReq::decode(buff).map(|(apdu, _n)| Event::from(apdu)),
            SignInit::INS => {
                // Sign frames share an instruction; the leading kind byte
                // selects the frame type
                match buff.first().copied().map(PayloadKind::try_from) {
                    Some(Ok(PayloadKind::Init)) => {
                        SignInit::decode(buff).map(|(apdu, _n)| Event::from(apdu))
                    }
                    Some(Ok(_)) => SignData::decode(buff).map(|(apdu, _n)| Event::from(apdu)),
                    _ => Err(ApduError::InvalidEncoding),
                }
            }
            _ => Err(ApduError::InvalidEncoding),
        }
    }
}

impl<'a> From<AddressReq<'a>> for Event<'a> {
    fn from(a: AddressReq<'a>) -> Self {
        Event::GetAddress {
            path: a.path,
            hrp: a.hrp,
            confirm: a.confirm,
        }
    }
}

impl<'a> From<SignInit<'a>> for Event<'a> {
    fn from(a: SignInit<'a>) -> Self {
        Event::SignInit {
            path: a.path,
            hrp: a.hrp,
            encoding: a.encoding,
        }
    }
}

impl<'a> From<SignData<'a>> for Event<'a> {
    fn from(a: SignData<'a>) -> Self {
        Event::SignData {
            seq: a.seq,
            data: a.data,
            last: a.kind == PayloadKind::Last,
        }
    }
}
