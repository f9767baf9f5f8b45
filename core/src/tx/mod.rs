// Copyright (c) 2018-2024 Zondax AG

//! Transaction decoding
//!
//! Two codecs produce the same display contract: an ordered list of
//! (label, value) items, each item rendered one fixed-width page at a time.
//! Items are addressed by display index and page index so that no more than
//! one page of formatted output exists at any moment; the raw buffer (plus,
//! for the structured-text codec, its parse tree) is the only retained state.

use heapless::String;

pub mod json;
pub mod textual;

pub use json::JsonTx;
pub use textual::TextualMeta;

/// Maximum rendered label length in bytes
pub const KEY_LEN: usize = 64;

/// Display page width in characters
pub const PAGE_CHARS: usize = 38;

/// Rendered value page buffer size in bytes (UTF-8 worst case)
pub const VAL_LEN: usize = PAGE_CHARS * 4;

/// Maximum reviewable items per transaction
pub const MAX_ITEMS: usize = 255;

/// Rendered item label buffer
pub type OutKey = String<KEY_LEN>;

/// Rendered value page buffer
pub type OutVal = String<VAL_LEN>;

/// Decoder errors
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum ParserError {
    #[cfg_attr(feature = "thiserror", error("no data"))]
    NoData,
    #[cfg_attr(feature = "thiserror", error("display index out of range"))]
    DisplayIdxOutOfRange,
    #[cfg_attr(feature = "thiserror", error("display page out of range"))]
    DisplayPageOutOfRange,
    #[cfg_attr(feature = "thiserror", error("unexpected type"))]
    UnexpectedType,
    #[cfg_attr(feature = "thiserror", error("unexpected value"))]
    UnexpectedValue,
    #[cfg_attr(feature = "thiserror", error("unexpected field"))]
    UnexpectedField,
    #[cfg_attr(feature = "thiserror", error("unexpected number of items"))]
    UnexpectedNumberItems,
    #[cfg_attr(feature = "thiserror", error("unexpected buffer end"))]
    UnexpectedBufferEnd,
    #[cfg_attr(feature = "thiserror", error("unexpected chain"))]
    UnexpectedChain,
    #[cfg_attr(feature = "thiserror", error("value out of range"))]
    ValueOutOfRange,
    #[cfg_attr(feature = "thiserror", error("transaction is too big"))]
    TransactionTooBig,

    #[cfg_attr(feature = "thiserror", error("JSON string is not complete"))]
    JsonIncomplete,
    #[cfg_attr(feature = "thiserror", error("JSON contains whitespace in the corpus"))]
    JsonContainsWhitespace,
    #[cfg_attr(feature = "thiserror", error("JSON dictionaries are not sorted"))]
    JsonNotSorted,
    #[cfg_attr(feature = "thiserror", error("JSON missing chain_id"))]
    JsonMissingChainId,
    #[cfg_attr(feature = "thiserror", error("JSON missing sequence"))]
    JsonMissingSequence,
    #[cfg_attr(feature = "thiserror", error("JSON missing fee"))]
    JsonMissingFee,
    #[cfg_attr(feature = "thiserror", error("JSON missing msgs"))]
    JsonMissingMsgs,
    #[cfg_attr(feature = "thiserror", error("JSON missing account number"))]
    JsonMissingAccountNumber,
    #[cfg_attr(feature = "thiserror", error("JSON missing memo"))]
    JsonMissingMemo,

    #[cfg_attr(feature = "thiserror", error("unexpected CBOR error"))]
    CborUnexpected,
    #[cfg_attr(feature = "thiserror", error("unexpected CBOR EOF"))]
    CborUnexpectedEof,
    #[cfg_attr(feature = "thiserror", error("CBOR was not in canonical order"))]
    CborNotCanonical,
}

impl ParserError {
    /// Stable human-readable description, surfaced to the host alongside
    /// the status word on decode failures
    pub fn description(&self) -> &'static str {
        match self {
            ParserError::NoData => "No more data",
            ParserError::DisplayIdxOutOfRange => "display index out of range",
            ParserError::DisplayPageOutOfRange => "display page out of range",
            ParserError::UnexpectedType => "unexpected type",
            ParserError::UnexpectedValue => "Unexpected value",
            ParserError::UnexpectedField => "Unexpected field",
            ParserError::UnexpectedNumberItems => "Unexpected number of items",
            ParserError::UnexpectedBufferEnd => "Unexpected buffer end",
            ParserError::UnexpectedChain => "Unexpected chain",
            ParserError::ValueOutOfRange => "Value out of range",
            ParserError::TransactionTooBig => "Transaction is too big",
            ParserError::JsonIncomplete => "JSON string is not complete",
            ParserError::JsonContainsWhitespace => "JSON Contains whitespace in the corpus",
            ParserError::JsonNotSorted => "JSON Dictionaries are not sorted",
            ParserError::JsonMissingChainId => "JSON Missing chain_id",
            ParserError::JsonMissingSequence => "JSON Missing sequence",
            ParserError::JsonMissingFee => "JSON Missing fee",
            ParserError::JsonMissingMsgs => "JSON Missing msgs",
            ParserError::JsonMissingAccountNumber => "JSON Missing account number",
            ParserError::JsonMissingMemo => "JSON Missing memo",
            ParserError::CborUnexpected => "unexpected CBOR error",
            ParserError::CborUnexpectedEof => "Unexpected CBOR EOF",
            ParserError::CborNotCanonical => "CBOR was not in canonical order",
        }
    }
}

/// A parsed transaction, ready for item queries
///
/// The textual variant keeps only counts and re-walks the raw buffer on
/// every query; the structured-text variant owns its parse tree.
#[derive(Clone, Debug)]
pub enum ParsedTx {
    Json(JsonTx),
    Textual(TextualMeta),
}

impl ParsedTx {
    /// Number of reviewable items for the given mode
    pub fn num_items(&self, expert: bool) -> Result<u8, ParserError> {
        match self {
            ParsedTx::Json(tx) => tx.num_items(expert),
            ParsedTx::Textual(meta) => Ok(meta.num_items(expert)),
        }
    }

    /// Render one page of one item
    ///
    /// Returns the item's total page count. `raw` must be the buffer the
    /// transaction was parsed from.
    pub fn get_item(
        &self,
        raw: &[u8],
        display_idx: u8,
        page_idx: u8,
        expert: bool,
        key: &mut OutKey,
        val: &mut OutVal,
    ) -> Result<u8, ParserError> {
        match self {
            ParsedTx::Json(tx) => tx.get_item(display_idx, page_idx, expert, key, val),
            ParsedTx::Textual(meta) => {
                textual::get_item(raw, meta, display_idx, page_idx, expert, key, val)
            }
        }
    }
}

/// Paginate `src` into fixed-width character windows
///
/// Writes the requested page into `out` and returns the total page count.
/// The empty string counts as a single page.
pub fn page_string(src: &str, page_idx: u8, out: &mut OutVal) -> Result<u8, ParserError> {
    let total_chars = src.chars().count();
    let pages = total_chars.div_ceil(PAGE_CHARS).max(1);

    if pages > u8::MAX as usize {
        return Err(ParserError::ValueOutOfRange);
    }
    if page_idx as usize >= pages {
        return Err(ParserError::DisplayPageOutOfRange);
    }

    out.clear();
    for c in src
        .chars()
        .skip(page_idx as usize * PAGE_CHARS)
        .take(PAGE_CHARS)
    {
        out.push(c).map_err(|_| ParserError::UnexpectedBufferEnd)?;
    }

    Ok(pages as u8)
}

/// Append to a bounded label buffer, truncating on overflow
pub(crate) fn push_key(out: &mut OutKey, s: &str) {
    for c in s.chars() {
        if out.push(c).is_err() {
            return;
        }
    }
}
