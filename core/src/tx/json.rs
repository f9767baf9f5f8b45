// Copyright (c) 2018-2024 Zondax AG

//! Structured-text (sign-doc JSON) transaction codec
//!
//! Parses the canonical sign document into an order-preserving tree and
//! exposes it through the item/page display contract. The document must be
//! byte-canonical: no whitespace outside strings, object keys sorted, and
//! the six standard root keys present. Extra root keys are displayed, not
//! rejected.

use alloc::string::{String, ToString};

use core::fmt::Write;

use serde_json::Value;

use crate::chain::{
    DEFAULT_CHAIN_ID, DEFAULT_DENOM_BASE, DEFAULT_DENOM_FACTOR, DEFAULT_DENOM_REPR,
};

use super::{page_string, push_key, OutKey, OutVal, ParserError, MAX_ITEMS, PAGE_CHARS};

/// Fixed display order and traversal depth for the standard root keys
const ROOT_ORDER: &[(&str, u8)] = &[
    ("chain_id", 2),
    ("account_number", 2),
    ("sequence", 2),
    ("fee", 1),
    ("memo", 2),
    ("msgs", 2),
];

/// Traversal depth for root keys outside the standard set
const EXTRA_ROOT_DEPTH: u8 = 1;

/// Required root keys in validation order, with the error reported when absent
const REQUIRED_ROOTS: &[(&str, ParserError)] = &[
    ("chain_id", ParserError::JsonMissingChainId),
    ("sequence", ParserError::JsonMissingSequence),
    ("fee", ParserError::JsonMissingFee),
    ("msgs", ParserError::JsonMissingMsgs),
    ("account_number", ParserError::JsonMissingAccountNumber),
    ("memo", ParserError::JsonMissingMemo),
];

/// Display-key substitutions applied after traversal
const KEY_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("chain_id", "Chain ID"),
    ("account_number", "Account"),
    ("sequence", "Sequence"),
    ("memo", "Memo"),
    ("fee/amount", "Fee"),
    ("fee/gas", "Gas"),
    ("msgs/type", "Type"),
    // Multisend
    ("msgs/inputs/address", "Source Address"),
    ("msgs/inputs/coins", "Source Coins"),
    ("msgs/outputs/address", "Dest Address"),
    ("msgs/outputs/coins", "Dest Coins"),
    ("msgs/value/inputs/address", "Source Address"),
    ("msgs/value/inputs/coins", "Source Coins"),
    ("msgs/value/outputs/address", "Dest Address"),
    ("msgs/value/outputs/coins", "Dest Coins"),
    // MsgSend
    ("msgs/value/from_address", "From"),
    ("msgs/value/to_address", "To"),
    ("msgs/value/amount", "Amount"),
    // MsgDelegate / MsgUndelegate
    ("msgs/value/delegator_address", "Delegator"),
    ("msgs/value/validator_address", "Validator"),
    // MsgBeginRedelegate
    ("msgs/value/validator_src_address", "Validator Source"),
    ("msgs/value/validator_dst_address", "Validator Dest"),
    // MsgSubmitProposal
    ("msgs/value/description", "Description"),
    ("msgs/value/initial_deposit/amount", "Deposit Amount"),
    ("msgs/value/initial_deposit/denom", "Deposit Denom"),
    ("msgs/value/proposal_type", "Proposal"),
    ("msgs/value/proposer", "Proposer"),
    ("msgs/value/title", "Title"),
    // MsgDeposit
    ("msgs/value/depositer", "Sender"),
    ("msgs/value/proposal_id", "Proposal ID"),
    // MsgVote
    ("msgs/value/voter", "Description"),
    ("msgs/value/option", "Option"),
];

/// Message type value substitutions
const VALUE_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("cosmos-sdk/MsgSend", "Send"),
    ("cosmos-sdk/MsgDelegate", "Delegate"),
    ("cosmos-sdk/MsgUndelegate", "Undelegate"),
    ("cosmos-sdk/MsgBeginRedelegate", "Redelegate"),
    ("cosmos-sdk/MsgSubmitProposal", "Propose"),
    ("cosmos-sdk/MsgDeposit", "Deposit"),
    ("cosmos-sdk/MsgVote", "Vote"),
    ("cosmos-sdk/MsgWithdrawDelegationReward", "Withdraw Reward"),
    ("cosmos-sdk/MsgWithdrawValidatorCommission", "Withdraw Val. Commission"),
    ("cosmos-sdk/MsgSetWithdrawAddress", "Withdraw Set Address"),
    ("cosmos-sdk/MsgMultiSend", "Multi Send"),
];

/// Keys whose values are coin lists, folded into one formatted item
const AMOUNT_KEYS: &[&str] = &[
    "fee/amount",
    "msgs/inputs/coins",
    "msgs/outputs/coins",
    "msgs/value/inputs/coins",
    "msgs/value/outputs/coins",
    "msgs/value/amount",
    "tip/amount",
];

/// Internal key-path buffer
type KeyPath = heapless::String<{ super::KEY_LEN }>;

/// Leaf reached by the display traversal
enum Leaf<'a> {
    /// Plain value, rendered as its text (strings) or compact JSON
    Plain(&'a Value),
    /// Coin list, rendered through amount formatting
    Amount(&'a Value),
}

/// Parsed structured-text transaction
#[derive(Clone, PartialEq, Debug)]
pub struct JsonTx {
    root: Value,
    default_chain: bool,
}

impl JsonTx {
    /// Parse and validate a sign document
    pub fn parse(data: &[u8]) -> Result<Self, ParserError> {
        if data.is_empty() {
            return Err(ParserError::NoData);
        }

        let root: Value =
            serde_json::from_slice(data).map_err(|_| ParserError::JsonIncomplete)?;

        let obj = match root.as_object() {
            Some(o) => o,
            None => return Err(ParserError::UnexpectedType),
        };

        validate_no_whitespace(data)?;
        validate_sorted(&root)?;

        for (key, err) in REQUIRED_ROOTS {
            if !obj.contains_key(*key) {
                return Err(*err);
            }
        }

        let default_chain = obj.get("chain_id").and_then(Value::as_str) == Some(DEFAULT_CHAIN_ID);

        Ok(Self {
            root,
            default_chain,
        })
    }

    /// Number of reviewable items
    pub fn num_items(&self, _expert: bool) -> Result<u8, ParserError> {
        let mut count = 0usize;

        self.for_each(&mut |_, _, _| {
            count += 1;
            if count > MAX_ITEMS {
                return Err(ParserError::UnexpectedNumberItems);
            }
            Ok(false)
        })?;

        Ok(count as u8)
    }

    /// Render one page of one item, returning the item's page count
    pub fn get_item(
        &self,
        display_idx: u8,
        page_idx: u8,
        expert: bool,
        key: &mut OutKey,
        val: &mut OutVal,
    ) -> Result<u8, ParserError> {
        let mut idx = 0u16;
        let mut pages = None;

        self.for_each(&mut |path, pos, leaf| {
            if idx == display_idx as u16 {
                pages = Some(self.render(path, pos, leaf, expert, page_idx, key, val)?);
                return Ok(true);
            }
            idx += 1;
            Ok(false)
        })?;

        pages.ok_or(ParserError::DisplayIdxOutOfRange)
    }

    /// Drive `f` over every displayable item in order; `f` returns true to stop
    fn for_each<'s>(
        &'s self,
        f: &mut dyn FnMut(&str, Option<(usize, usize)>, Leaf<'s>) -> Result<bool, ParserError>,
    ) -> Result<(), ParserError> {
        let obj = match self.root.as_object() {
            Some(o) => o,
            None => return Err(ParserError::UnexpectedType),
        };

        let mut key = KeyPath::new();

        for (root_key, depth) in ROOT_ORDER {
            let value = match obj.get(*root_key) {
                Some(v) => v,
                None => continue,
            };

            // An empty memo is not shown
            if *root_key == "memo" && value.as_str() == Some("") {
                continue;
            }

            key.clear();
            push_key_path(&mut key, root_key);
            if walk(&mut key, value, *depth, None, f)? {
                return Ok(());
            }
        }

        // Extra root keys are displayed in document order
        for (root_key, value) in obj {
            if ROOT_ORDER.iter().any(|(k, _)| *k == root_key.as_str()) {
                continue;
            }

            key.clear();
            push_key_path(&mut key, root_key);
            if walk(&mut key, value, EXTRA_ROOT_DEPTH, None, f)? {
                return Ok(());
            }
        }

        Ok(())
    }

    fn render(
        &self,
        path: &str,
        pos: Option<(usize, usize)>,
        leaf: Leaf,
        expert: bool,
        page_idx: u8,
        key: &mut OutKey,
        val: &mut OutVal,
    ) -> Result<u8, ParserError> {
        key.clear();
        push_key(key, friendly_key(path));
        if let Some((i, n)) = pos {
            let _ = write!(key, " ({i}/{n})");
        }

        match leaf {
            Leaf::Plain(Value::String(s)) => page_string(substitute_value(s), page_idx, val),
            Leaf::Plain(v) => {
                let s = v.to_string();
                page_string(&s, page_idx, val)
            }
            Leaf::Amount(v) => self.format_amount(v, expert, page_idx, val),
        }
    }

    /// Render a coin list: one page per coin, `Empty` for an empty list
    fn format_amount(
        &self,
        value: &Value,
        expert: bool,
        page_idx: u8,
        out: &mut OutVal,
    ) -> Result<u8, ParserError> {
        let items = match value {
            Value::Object(_) => {
                let s = self.format_coin(value, expert)?;
                return page_string(&s, page_idx, out);
            }
            Value::Array(items) if items.is_empty() => {
                return page_string("Empty", page_idx, out);
            }
            Value::Array(items) => items,
            _ => return Err(ParserError::UnexpectedField),
        };

        let mut total = 0usize;
        let mut target = None;

        for item in items {
            let s = self.format_coin(item, expert)?;
            let pages = s.chars().count().div_ceil(PAGE_CHARS).max(1);

            if target.is_none() && (page_idx as usize) < total + pages {
                target = Some((s, (page_idx as usize - total) as u8));
            }
            total += pages;
        }

        if total > u8::MAX as usize {
            return Err(ParserError::ValueOutOfRange);
        }

        let (s, sub_page) = target.ok_or(ParserError::DisplayPageOutOfRange)?;
        page_string(&s, sub_page, out)?;

        Ok(total as u8)
    }

    /// Format a single `{amount, denom}` pair
    fn format_coin(&self, value: &Value, expert: bool) -> Result<String, ParserError> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => return Err(ParserError::UnexpectedField),
        };

        if obj.len() != 2 {
            return Err(ParserError::UnexpectedField);
        }

        let amount = text_of(obj.get("amount").ok_or(ParserError::UnexpectedField)?)?;
        let denom = text_of(obj.get("denom").ok_or(ParserError::UnexpectedField)?)?;

        // The default denomination is shown in whole units unless expert
        // mode or a non-default chain id requires the raw value
        if !expert && self.default_chain && denom == DEFAULT_DENOM_BASE {
            let shifted = shift_decimal(&amount, DEFAULT_DENOM_FACTOR)?;
            let mut s = shifted;
            s.push(' ');
            s.push_str(DEFAULT_DENOM_REPR);
            return Ok(s);
        }

        let mut s = amount;
        s.push(' ');
        s.push_str(&denom);
        Ok(s)
    }
}

/// Recursive depth-first display traversal
fn walk<'a>(
    key: &mut KeyPath,
    value: &'a Value,
    level: u8,
    pos: Option<(usize, usize)>,
    f: &mut dyn FnMut(&str, Option<(usize, usize)>, Leaf<'a>) -> Result<bool, ParserError>,
) -> Result<bool, ParserError> {
    // Coin lists fold into a single formatted item wherever they appear
    if is_amount_key(key.as_str()) && (value.is_array() || value.is_object()) {
        return f(key.as_str(), pos, Leaf::Amount(value));
    }

    match value {
        Value::Object(map) if level > 0 => {
            for (k, v) in map {
                let prev = key.len();
                push_key_path(key, "/");
                push_key_path(key, k);

                let next_level = level - 1 + extra_msg_depth(key.as_str(), v);
                let stop = walk(key, v, next_level, pos, f)?;

                key.truncate(prev);
                if stop {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Array(items) if level > 0 => {
            let n = items.len();
            for (i, v) in items.iter().enumerate() {
                // Elements of a multi-entry list carry a positional label;
                // the outermost list position wins
                let p = match pos {
                    None if n > 1 => Some((i + 1, n)),
                    p => p,
                };

                if walk(key, v, level, p, f)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => f(key.as_str(), pos, Leaf::Plain(value)),
    }
}

/// Multisend messages itemize one level deeper so their coin lists are
/// reachable instead of collapsing into raw JSON
fn extra_msg_depth(key: &str, value: &Value) -> u8 {
    if key != "msgs/value" {
        return 0;
    }

    let is_multi = value
        .as_object()
        .map(|o| o.contains_key("inputs") && o.contains_key("outputs"))
        .unwrap_or(false);

    if is_multi {
        1
    } else {
        0
    }
}

fn push_key_path(key: &mut KeyPath, s: &str) {
    for c in s.chars() {
        if key.push(c).is_err() {
            return;
        }
    }
}

fn is_amount_key(key: &str) -> bool {
    AMOUNT_KEYS.contains(&key)
}

fn friendly_key(path: &str) -> &str {
    for (from, to) in KEY_SUBSTITUTIONS {
        if *from == path {
            return to;
        }
    }
    path
}

fn substitute_value(value: &str) -> &str {
    for (from, to) in VALUE_SUBSTITUTIONS {
        if *from == value {
            return to;
        }
    }
    value
}

fn text_of(value: &Value) -> Result<String, ParserError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ParserError::UnexpectedField),
    }
}

/// Shift an integer amount down by `factor` decimal places, trimming
/// insignificant zeros
fn shift_decimal(amount: &str, factor: usize) -> Result<String, ParserError> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParserError::UnexpectedValue);
    }

    let digits = amount.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut s = String::new();
    if digits.len() <= factor {
        s.push_str("0.");
        for _ in 0..factor - digits.len() {
            s.push('0');
        }
        s.push_str(digits);
    } else {
        let (whole, frac) = digits.split_at(digits.len() - factor);
        s.push_str(whole);
        s.push('.');
        s.push_str(frac);
    }

    // Trim the fractional part down to significant digits
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    Ok(String::from(if trimmed.is_empty() { "0" } else { trimmed }))
}

/// Reject whitespace outside string literals
fn validate_no_whitespace(data: &[u8]) -> Result<(), ParserError> {
    let mut in_string = false;
    let mut escaped = false;

    for &b in data {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b.is_ascii_whitespace() {
            return Err(ParserError::JsonContainsWhitespace);
        }
    }

    Ok(())
}

/// Require every object's keys to be sorted, recursively
fn validate_sorted(value: &Value) -> Result<(), ParserError> {
    match value {
        Value::Object(map) => {
            let mut prev: Option<&str> = None;
            for (k, v) in map {
                if let Some(p) = prev {
                    if p > k.as_str() {
                        return Err(ParserError::JsonNotSorted);
                    }
                }
                prev = Some(k);
                validate_sorted(v)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for v in items {
                validate_sorted(v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
