// Copyright (c) 2018-2024 Zondax AG

//! Review pagination
//!
//! Turns a decoded transaction into a bounded sequence of screens, one value
//! page per screen. The whole sequence is rendered once at construction so a
//! transaction that cannot be fully displayed is rejected before the first
//! screen reaches the user, and the total count is known up front for
//! progress display. Screens are re-rendered from the decoder on demand;
//! only the cursor lives here.

use core::fmt::Write;

use crate::tx::{OutKey, OutVal, ParsedTx, ParserError};

/// One rendered review screen
#[derive(Clone, PartialEq, Debug)]
pub struct Screen {
    pub title: OutKey,
    pub value: OutVal,
    /// Zero-based screen position
    pub index: u8,
    /// Total screens in this review
    pub total: u8,
}

/// Review cursor over a parsed transaction
#[derive(Clone, PartialEq, Debug)]
pub struct Review {
    cursor: u8,
    num_screens: u8,
}

impl Review {
    /// Build a review, rendering every screen once to validate the sequence
    pub fn new(tx: &ParsedTx, raw: &[u8], expert: bool) -> Result<Self, ParserError> {
        let num_items = tx.num_items(expert)?;
        if num_items == 0 {
            return Err(ParserError::UnexpectedNumberItems);
        }

        let mut key = OutKey::new();
        let mut val = OutVal::new();
        let mut total = 0usize;

        for item in 0..num_items {
            let pages = tx.get_item(raw, item, 0, expert, &mut key, &mut val)?;
            for page in 1..pages {
                tx.get_item(raw, item, page, expert, &mut key, &mut val)?;
            }
            total += pages as usize;
        }

        if total == 0 || total > u8::MAX as usize {
            return Err(ParserError::UnexpectedNumberItems);
        }

        Ok(Self {
            cursor: 0,
            num_screens: total as u8,
        })
    }

    /// Total screen count
    pub fn num_screens(&self) -> u8 {
        self.num_screens
    }

    /// Current screen position
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Whether the cursor is on the final screen
    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.num_screens
    }

    /// Advance one screen, saturating at the end
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Step back one screen, saturating at the start
    pub fn prev(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Render the screen under the cursor
    ///
    /// Values spanning multiple screens carry a `[k/N]` continuation marker
    /// in the title.
    pub fn render(&self, tx: &ParsedTx, raw: &[u8], expert: bool) -> Result<Screen, ParserError> {
        let num_items = tx.num_items(expert)?;

        let mut key = OutKey::new();
        let mut val = OutVal::new();
        let mut remaining = self.cursor;

        for item in 0..num_items {
            let pages = tx.get_item(raw, item, 0, expert, &mut key, &mut val)?;

            if remaining < pages {
                if remaining > 0 {
                    tx.get_item(raw, item, remaining, expert, &mut key, &mut val)?;
                }
                if pages > 1 {
                    let _ = write!(key, " [{}/{}]", remaining + 1, pages);
                }

                return Ok(Screen {
                    title: key,
                    value: val,
                    index: self.cursor,
                    total: self.num_screens,
                });
            }

            remaining -= pages;
        }

        Err(ParserError::DisplayIdxOutOfRange)
    }
}
