// Copyright (c) 2018-2024 Zondax AG

//! Status words appended to every response frame
//!
//! Codes follow the device convention established by prior releases and must
//! stay stable for host compatibility. The one code observed to vary between
//! firmware revisions (the invalid-HD-path value) is resolved through
//! [`StatusTable`] rather than hardcoded at call sites.

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

/// Response status word (SW1/SW2, big-endian on the wire)
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusWord {
    /// Operation completed
    Ok = 0x9000,

    /// Internal execution error
    ExecutionError = 0x6400,

    /// Frame shorter than its declared length
    WrongLength = 0x6700,

    /// No data available for the requested operation
    EmptyBuffer = 0x6982,

    /// Response exceeds output capacity
    OutputBufferTooSmall = 0x6983,

    /// Payload rejected by validation (decode failure, policy failure)
    DataInvalid = 0x6984,

    /// User rejected the operation on-device
    ConditionsNotSatisfied = 0x6985,

    /// Command refused in the current state
    CommandNotAllowed = 0x6986,

    /// Path purpose / coin-type / change component out of policy
    InvalidPathCoin = 0x6987,

    /// HRP length outside the accepted range
    HrpWrongLength = 0x6988,

    /// Path component above the non-expert ceiling
    InvalidPathValue = 0x6989,

    /// No chain configuration matches the submitted HRP / coin type
    ChainConfigNotSupported = 0x698C,

    /// Sign payload chunk out of sequence
    ChunkOutOfOrder = 0x698D,

    /// Transaction data exceeds the accumulation buffer
    BufferCapacityExceeded = 0x698E,

    /// P1/P2 combination not recognised
    InvalidP1P2 = 0x6B00,

    /// Instruction not recognised
    InsNotSupported = 0x6D00,

    /// Class byte mismatch
    ClaNotSupported = 0x6E00,

    /// Unclassified failure
    Unknown = 0x6F00,
}

impl StatusWord {
    /// Human-readable summary, matching the strings hosts display
    pub fn message(&self) -> &'static str {
        match self {
            StatusWord::Ok => "No errors",
            StatusWord::ExecutionError => "Execution Error",
            StatusWord::WrongLength => "Wrong Length",
            StatusWord::EmptyBuffer => "Empty Buffer",
            StatusWord::OutputBufferTooSmall => "Output buffer too small",
            StatusWord::DataInvalid => "Data is invalid",
            StatusWord::ConditionsNotSatisfied => "Conditions not satisfied",
            StatusWord::CommandNotAllowed => "Transaction rejected",
            StatusWord::InvalidPathCoin => "Invalid HD Path Coin Value",
            StatusWord::HrpWrongLength => "HRP length out of range",
            StatusWord::InvalidPathValue => "Invalid HD Path Value. Expert Mode required.",
            StatusWord::ChainConfigNotSupported => "Chain config not supported",
            StatusWord::ChunkOutOfOrder => "Payload chunk out of order",
            StatusWord::BufferCapacityExceeded => "Transaction data exceeds buffer capacity",
            StatusWord::InvalidP1P2 => "Invalid P1/P2",
            StatusWord::InsNotSupported => "Instruction not supported",
            StatusWord::ClaNotSupported => "CLA not supported",
            StatusWord::Unknown => "Unknown error",
        }
    }

    /// Numeric code as transmitted
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Write the status word to the end of a response buffer, returning
    /// the total response length
    pub fn append(&self, buff: &mut [u8], offset: usize) -> usize {
        let code = self.code().to_be_bytes();
        buff[offset] = code[0];
        buff[offset + 1] = code[1];
        offset + 2
    }
}

/// Status table revision
///
/// Firmware revisions disagree on the code reported for a path component
/// above the non-expert ceiling; the mapping is versioned so hosts pinned
/// to either convention can be served.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum Revision {
    /// 0x6989 convention
    #[default]
    Current,
    /// Releases which reported the condition as 0x6985
    Legacy,
}

/// Versioned status mapping
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct StatusTable {
    revision: Revision,
}

impl StatusTable {
    /// Create a table for the given revision
    pub const fn new(revision: Revision) -> Self {
        Self { revision }
    }

    /// Status word for a path component above the non-expert ceiling
    pub fn invalid_path_value(&self) -> StatusWord {
        match self.revision {
            Revision::Current => StatusWord::InvalidPathValue,
            Revision::Legacy => StatusWord::ConditionsNotSatisfied,
        }
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn codes_round_trip() {
        for sw in StatusWord::iter() {
            assert_eq!(StatusWord::try_from(sw.code()).unwrap(), sw);
        }
    }

    #[test]
    fn append_writes_big_endian() {
        let mut buff = [0u8; 4];
        let n = StatusWord::Ok.append(&mut buff, 0);
        assert_eq!(n, 2);
        assert_eq!(&buff[..2], &[0x90, 0x00]);

        let n = StatusWord::ChainConfigNotSupported.append(&mut buff, 2);
        assert_eq!(n, 4);
        assert_eq!(&buff[2..], &[0x69, 0x8C]);
    }

    #[test]
    fn revisioned_invalid_path() {
        assert_eq!(
            StatusTable::new(Revision::Current).invalid_path_value(),
            StatusWord::InvalidPathValue
        );
        assert_eq!(
            StatusTable::new(Revision::Legacy).invalid_path_value(),
            StatusWord::ConditionsNotSatisfied
        );
    }
}
