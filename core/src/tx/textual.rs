// Copyright (c) 2018-2024 Zondax AG

//! Textual (SIGN_MODE_TEXTUAL) transaction codec
//!
//! The payload is a canonical CBOR array of screen maps, each map carrying
//! integer keys: 1 = title (optional), 2 = content (required), 3 = indent,
//! 4 = expert. Decoding is a single forward pass over the raw buffer and
//! nothing but screen counts is retained; item queries re-walk the buffer.

use minicbor::{data::Type, Decoder};

use super::{page_string, push_key, OutKey, OutVal, ParserError, MAX_ITEMS};

/// Screen map keys
const TITLE_KEY: u32 = 1;
const CONTENT_KEY: u32 = 2;
const INDENT_KEY: u32 = 3;
const EXPERT_KEY: u32 = 4;

/// Maximum title length in bytes
const MAX_TITLE_LEN: usize = 63;

/// Maximum content length in bytes
const MAX_CONTENT_LEN: usize = 512;

/// Indent prefix applied per level
const SCREEN_INDENT: &str = "  ";

/// Counts retained from the validation pass
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TextualMeta {
    n_screens: u8,
    n_expert: u8,
}

impl TextualMeta {
    /// Number of visible items for the given mode
    pub fn num_items(&self, expert: bool) -> u8 {
        if expert {
            self.n_screens
        } else {
            self.n_screens - self.n_expert
        }
    }
}

/// One decoded screen, borrowing the raw buffer
struct RawScreen<'a> {
    title: &'a str,
    content: &'a str,
    indent: u8,
    expert: bool,
}

fn map_cbor(e: minicbor::decode::Error) -> ParserError {
    if e.is_end_of_input() {
        ParserError::CborUnexpectedEof
    } else {
        ParserError::CborUnexpected
    }
}

/// Parse and validate a textual payload in one forward pass
pub fn parse(data: &[u8]) -> Result<TextualMeta, ParserError> {
    if data.is_empty() {
        return Err(ParserError::NoData);
    }

    let mut d = Decoder::new(data);

    let n_screens = d
        .array()
        .map_err(map_cbor)?
        .ok_or(ParserError::CborNotCanonical)?;

    if n_screens == 0 || n_screens > MAX_ITEMS as u64 {
        return Err(ParserError::UnexpectedNumberItems);
    }

    let mut n_expert = 0u8;
    for _ in 0..n_screens {
        let screen = decode_screen(&mut d)?;

        // A placeholder chain id is not reviewable
        if screen.title == "Chain id" && (screen.content == "0" || screen.content == "1") {
            return Err(ParserError::UnexpectedChain);
        }

        if screen.expert {
            n_expert += 1;
        }
    }

    // End of buffer must match end of parsed data
    if d.position() != data.len() {
        return Err(ParserError::CborUnexpectedEof);
    }

    Ok(TextualMeta {
        n_screens: n_screens as u8,
        n_expert,
    })
}

/// Decode a single screen map, enforcing canonical key order
fn decode_screen<'a>(d: &mut Decoder<'a>) -> Result<RawScreen<'a>, ParserError> {
    let n_fields = d
        .map()
        .map_err(map_cbor)?
        .ok_or(ParserError::CborNotCanonical)?;

    if n_fields == 0 || n_fields > 4 {
        return Err(ParserError::UnexpectedValue);
    }

    let mut screen = RawScreen {
        title: "",
        content: "",
        indent: 0,
        expert: false,
    };
    let mut have_content = false;
    let mut last_key = 0u32;

    for _ in 0..n_fields {
        if d.datatype().map_err(map_cbor)? != Type::U8 {
            return Err(ParserError::UnexpectedType);
        }
        let key = d.u32().map_err(map_cbor)?;

        if key <= last_key {
            return Err(ParserError::CborNotCanonical);
        }
        last_key = key;

        match key {
            TITLE_KEY => {
                screen.title = d.str().map_err(map_cbor)?;
                if screen.title.len() > MAX_TITLE_LEN {
                    return Err(ParserError::UnexpectedValue);
                }
            }
            CONTENT_KEY => {
                screen.content = d.str().map_err(map_cbor)?;
                if screen.content.len() > MAX_CONTENT_LEN {
                    return Err(ParserError::UnexpectedValue);
                }
                have_content = true;
            }
            INDENT_KEY => {
                screen.indent = d.u8().map_err(map_cbor)?;
            }
            EXPERT_KEY => {
                screen.expert = d.bool().map_err(map_cbor)?;
            }
            _ => {
                // Unknown screen options are skipped, not rejected
                d.skip().map_err(map_cbor)?;
            }
        }
    }

    if !have_content {
        return Err(ParserError::UnexpectedType);
    }

    Ok(screen)
}

/// Render one page of one visible screen, returning its page count
pub fn get_item(
    data: &[u8],
    meta: &TextualMeta,
    display_idx: u8,
    page_idx: u8,
    expert: bool,
    key: &mut OutKey,
    val: &mut OutVal,
) -> Result<u8, ParserError> {
    if display_idx >= meta.num_items(expert) {
        return Err(ParserError::DisplayIdxOutOfRange);
    }

    let mut d = Decoder::new(data);

    let n_screens = d
        .array()
        .map_err(map_cbor)?
        .ok_or(ParserError::CborNotCanonical)?;

    let mut visible = 0u16;
    for _ in 0..n_screens {
        let screen = decode_screen(&mut d)?;

        // Structural metadata screens only surface in expert mode
        if screen.expert && !expert {
            continue;
        }

        if visible == display_idx as u16 {
            return render(&screen, page_idx, key, val);
        }
        visible += 1;
    }

    Err(ParserError::DisplayIdxOutOfRange)
}

fn render(
    screen: &RawScreen,
    page_idx: u8,
    key: &mut OutKey,
    val: &mut OutVal,
) -> Result<u8, ParserError> {
    key.clear();
    for _ in 0..screen.indent {
        push_key(key, SCREEN_INDENT);
    }
    push_key(key, screen.title);

    if key.is_empty() {
        push_key(key, " ");
    }

    page_string(screen.content, page_idx, val)
}
