// Copyright (c) 2018-2024 Zondax AG

//! Prelude for APDU consumers

pub use crate::{
    address::{AddressReq, AddressResp, MAX_HRP_LEN, PK_LEN},
    path::{Bip32Path, HARDENED, PATH_BYTES, PATH_LEN},
    sign::{Encoding, OutcomeReq, PayloadKind, SignData, SignInit, SignResp, MAX_DER_SIG_LEN},
    state::{StateResp, TxState},
    status::{Revision, StatusTable, StatusWord},
    version::{VersionReq, VersionResp},
    ApduError, ApduReq, ApduStatic, Instruction, APDU_HEADER_LEN, COSM_APDU_CLA,
};
