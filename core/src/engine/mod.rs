// Copyright (c) 2018-2024 Zondax AG

//! The [Engine] implements the device side of the signing protocol.
//!
//! It consumes [Event]s decoded from request APDUs and returns [Output]s to
//! be encoded as responses. User input (navigation, accept, reject, the
//! expert-mode toggle) arrives through methods rather than events, mirroring
//! how a display/input layer drives the engine on hardware.
//!
//! Command acceptance and outcome delivery are decoupled: a sign or
//! confirmed-address request is accepted with a pending state response, and
//! the terminal result is collected with [Event::GetOutcome]. A terminal
//! outcome replays on every poll until the next non-poll command clears it.

use core::fmt::Write as _;

use heapless::Vec;
use sha2::{Digest as _, Sha256};
use sha3::Keccak256;
use strum::{Display, EnumIter, EnumString};
use zeroize::Zeroize;

use ledger_cosm_apdu::{
    path::Bip32Path,
    sign::{Encoding, MAX_DER_SIG_LEN},
    state::TxState,
};

use crate::{
    addr::{self, AddressString, PK_UNCOMPRESSED_LEN},
    chain::{self, ChainConfig, HashKind},
    path,
    review::{Review, Screen},
    tx::{JsonTx, OutKey, ParsedTx, PAGE_CHARS},
};

mod error;
pub use error::Error;

mod event;
pub use event::Event;

mod output;
pub use output::Output;

/// Application version reported by [Event::GetVersion]
pub const VERSION: (u8, u8, u8) = (2, 36, 0);

/// Device target identifier reported by [Event::GetVersion]
pub const TARGET_ID: u32 = 0x3300_0004;

/// Transaction accumulation buffer capacity
pub const TX_BUFFER_LEN: usize = 8192;

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumIter)]
pub enum State {
    /// Idle, no operation running
    Init,
    /// Accumulating sign payload chunks
    Loading,
    /// Address confirmation pending user input
    AddressReview,
    /// Transaction review pending user input
    TxReview,
}

/// Terminal outcome of a user-facing operation
///
/// Held until the next non-poll command so repeated polls are idempotent.
#[derive(Clone, PartialEq, Debug)]
enum Outcome {
    Signature(Vec<u8, MAX_DER_SIG_LEN>),
    Address {
        public_key: [u8; 33],
        address: AddressString,
    },
    TxRejected,
    AddressRejected,
    Failed(Error),
}

/// Active signing request context
struct SignCtx {
    path: Bip32Path,
    config: ChainConfig,
    encoding: Encoding,
}

/// Pending address confirmation context
struct AddrCtx {
    path: Bip32Path,
    public_key: [u8; 33],
    address: AddressString,
}

/// [`Driver`] provides the trusted platform key primitives for [`Engine`]
/// instances; their correctness is assumed, not checked
pub trait Driver {
    /// Uncompressed SEC1 public key for a derivation path
    fn secp256k1_public_key(&self, path: &[u32; 5]) -> Result<[u8; PK_UNCOMPRESSED_LEN], Error>;

    /// Deterministic (RFC 6979) ECDSA over a 32-byte digest, DER encoding
    /// written to `signature`, returning the encoded length
    fn secp256k1_sign(
        &self,
        path: &[u32; 5],
        digest: &[u8; 32],
        signature: &mut [u8],
    ) -> Result<usize, Error>;
}

impl<T: Driver> Driver for &T {
    fn secp256k1_public_key(&self, path: &[u32; 5]) -> Result<[u8; PK_UNCOMPRESSED_LEN], Error> {
        T::secp256k1_public_key(self, path)
    }

    fn secp256k1_sign(
        &self,
        path: &[u32; 5],
        digest: &[u8; 32],
        signature: &mut [u8],
    ) -> Result<usize, Error> {
        T::secp256k1_sign(self, path, digest, signature)
    }
}

/// Hardware-independent signing engine
pub struct Engine<DRV: Driver> {
    drv: DRV,

    state: State,
    expert: bool,

    buffer: Vec<u8, TX_BUFFER_LEN>,
    next_seq: u8,

    sign_ctx: Option<SignCtx>,
    parsed: Option<ParsedTx>,
    review: Option<Review>,

    addr_ctx: Option<AddrCtx>,
    addr_cursor: u8,

    outcome: Option<Outcome>,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub fn new(drv: DRV) -> Self {
        Self {
            drv,
            state: State::Init,
            expert: false,
            buffer: Vec::new(),
            next_seq: 0,
            sign_ctx: None,
            parsed: None,
            review: None,
            addr_ctx: None,
            addr_cursor: 0,
            outcome: None,
        }
    }

    /// Handle an incoming event
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match (self.state, evt) {
            (_, Event::GetVersion) => Ok(Output::Version {
                test_mode: cfg!(debug_assertions),
                major: VERSION.0,
                minor: VERSION.1,
                patch: VERSION.2,
                target_id: TARGET_ID,
            }),

            (_, Event::GetOutcome) => self.get_outcome(),

            // One user-facing operation at a time
            (State::AddressReview | State::TxReview, _) => Err(Error::Busy),

            (_, Event::GetAddress { path, hrp, confirm }) => {
                self.clear_outcome();
                self.reset_sign();
                self.get_address(path, hrp, *confirm)
            }

            (
                _,
                Event::SignInit {
                    path,
                    hrp,
                    encoding,
                },
            ) => {
                self.clear_outcome();
                self.reset_sign();
                self.sign_init(path, hrp, *encoding)
            }

            (State::Loading, Event::SignData { seq, data, last }) => {
                self.sign_data(*seq, data, *last)
            }

            // Data frame without a preceding init
            (_, Event::SignData { .. }) => Err(Error::UnexpectedEvent),
        }
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether expert mode is active
    pub fn is_expert(&self) -> bool {
        self.expert
    }

    /// Toggle expert mode (settings menu input)
    ///
    /// Ignored while an operation is under review so the reviewed content
    /// cannot change mid-flight.
    pub fn set_expert(&mut self, expert: bool) {
        if self.state == State::Init {
            self.expert = expert;
        }
    }

    /// Total screens in the active review
    pub fn num_screens(&self) -> u8 {
        match self.state {
            State::TxReview => self.review.as_ref().map(|r| r.num_screens()).unwrap_or(0),
            State::AddressReview => self.addr_num_screens(),
            _ => 0,
        }
    }

    /// Current review screen position
    pub fn cursor(&self) -> u8 {
        match self.state {
            State::TxReview => self.review.as_ref().map(|r| r.cursor()).unwrap_or(0),
            State::AddressReview => self.addr_cursor,
            _ => 0,
        }
    }

    /// Render the review screen under the cursor
    pub fn review_screen(&self) -> Result<Screen, Error> {
        match self.state {
            State::TxReview => {
                let review = self.review.as_ref().ok_or(Error::UnexpectedEvent)?;
                let parsed = self.parsed.as_ref().ok_or(Error::UnexpectedEvent)?;
                Ok(review.render(parsed, &self.buffer, self.expert)?)
            }
            State::AddressReview => self.addr_screen(),
            _ => Err(Error::UnexpectedEvent),
        }
    }

    /// Advance the review one screen
    pub fn review_next(&mut self) -> bool {
        match self.state {
            State::TxReview => self.review.as_mut().map(|r| r.next()).unwrap_or(false),
            State::AddressReview => {
                if self.addr_cursor + 1 < self.addr_num_screens() {
                    self.addr_cursor += 1;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Step the review back one screen
    pub fn review_prev(&mut self) -> bool {
        match self.state {
            State::TxReview => self.review.as_mut().map(|r| r.prev()).unwrap_or(false),
            State::AddressReview => {
                if self.addr_cursor > 0 {
                    self.addr_cursor -= 1;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Approve the pending operation (user input)
    ///
    /// A transaction approval is only honored on the final review screen;
    /// an address approval is honored on any screen.
    pub fn approve(&mut self) {
        match self.state {
            State::AddressReview => {
                if let Some(ctx) = self.addr_ctx.take() {
                    self.outcome = Some(Outcome::Address {
                        public_key: ctx.public_key,
                        address: ctx.address,
                    });
                }
                self.state = State::Init;
            }
            State::TxReview => {
                let at_end = self.review.as_ref().map(|r| r.is_last()).unwrap_or(false);
                if !at_end {
                    return;
                }

                let outcome = match self.sign() {
                    Ok(sig) => Outcome::Signature(sig),
                    Err(e) => {
                        #[cfg(feature = "log")]
                        log::error!("signing failed: {:?}", e);

                        Outcome::Failed(e)
                    }
                };

                self.outcome = Some(outcome);
                self.reset_sign();
            }
            _ => (),
        }
    }

    /// Reject the pending operation (user input), valid on any screen
    pub fn reject(&mut self) {
        match self.state {
            State::AddressReview => {
                self.addr_ctx = None;
                self.outcome = Some(Outcome::AddressRejected);
                self.state = State::Init;
            }
            State::TxReview => {
                self.outcome = Some(Outcome::TxRejected);
                self.reset_sign();
            }
            _ => (),
        }
    }

    fn get_address(&mut self, path: &Bip32Path, hrp: &str, confirm: bool) -> Result<Output, Error> {
        // Chain lookup precedes all other validation
        let config = chain::resolve(path.coin_type(), hrp)?;
        path::validate(path, self.expert)?;

        let uncompressed = self.drv.secp256k1_public_key(path.components())?;
        let (public_key, address) = addr::derive(&config, hrp, &uncompressed)?;

        if !confirm {
            return Ok(Output::Address {
                public_key,
                address,
            });
        }

        self.addr_ctx = Some(AddrCtx {
            path: *path,
            public_key,
            address,
        });
        self.addr_cursor = 0;
        self.state = State::AddressReview;

        Ok(Output::State {
            state: TxState::AddressReview,
            screen: 0,
            num_screens: self.addr_num_screens(),
        })
    }

    fn sign_init(&mut self, path: &Bip32Path, hrp: &str, encoding: Encoding) -> Result<Output, Error> {
        let config = chain::resolve(path.coin_type(), hrp)?;
        path::validate(path, self.expert)?;

        // Per-chain signing policy gates before any data is accepted
        if config.expert_sign_only && !self.expert {
            return Err(Error::ExpertRequired);
        }

        self.sign_ctx = Some(SignCtx {
            path: *path,
            config,
            encoding,
        });
        self.next_seq = 1;
        self.state = State::Loading;

        Ok(Output::None)
    }

    fn sign_data(&mut self, seq: u8, data: &[u8], last: bool) -> Result<Output, Error> {
        if seq != self.next_seq {
            self.reset_sign();
            return Err(Error::ChunkOutOfOrder);
        }

        if self.buffer.extend_from_slice(data).is_err() {
            self.reset_sign();
            return Err(Error::BufferFull);
        }
        self.next_seq = self.next_seq.wrapping_add(1);

        if !last {
            return Ok(Output::None);
        }

        match self.parse_and_review() {
            Ok(output) => Ok(output),
            Err(e) => {
                self.reset_sign();
                Err(e)
            }
        }
    }

    fn parse_and_review(&mut self) -> Result<Output, Error> {
        let ctx = self.sign_ctx.as_ref().ok_or(Error::UnexpectedEvent)?;

        let parsed = match ctx.encoding {
            Encoding::Json => ParsedTx::Json(JsonTx::parse(&self.buffer)?),
            Encoding::Textual => ParsedTx::Textual(crate::tx::textual::parse(&self.buffer)?),
        };

        // Renders the full screen sequence, so a transaction that cannot be
        // completely displayed fails here, before any review is shown
        let review = Review::new(&parsed, &self.buffer, self.expert)?;
        let num_screens = review.num_screens();

        self.parsed = Some(parsed);
        self.review = Some(review);
        self.state = State::TxReview;

        Ok(Output::State {
            state: TxState::TxReview,
            screen: 0,
            num_screens,
        })
    }

    fn sign(&self) -> Result<Vec<u8, MAX_DER_SIG_LEN>, Error> {
        let ctx = self.sign_ctx.as_ref().ok_or(Error::UnexpectedEvent)?;

        let digest: [u8; 32] = match ctx.config.hash {
            HashKind::Sha256 => Sha256::digest(self.buffer.as_slice()).into(),
            HashKind::Keccak256 => Keccak256::digest(self.buffer.as_slice()).into(),
        };

        let mut der = [0u8; MAX_DER_SIG_LEN];
        let n = self
            .drv
            .secp256k1_sign(ctx.path.components(), &digest, &mut der)?;

        Vec::from_slice(&der[..n]).map_err(|_| Error::SignError)
    }

    fn get_outcome(&mut self) -> Result<Output, Error> {
        match self.state {
            State::AddressReview | State::TxReview => Ok(Output::State {
                state: self.tx_state(),
                screen: self.cursor(),
                num_screens: self.num_screens(),
            }),
            _ => match &self.outcome {
                Some(Outcome::Signature(sig)) => Ok(Output::Signature {
                    signature: sig.clone(),
                }),
                Some(Outcome::Address {
                    public_key,
                    address,
                }) => Ok(Output::Address {
                    public_key: *public_key,
                    address: address.clone(),
                }),
                Some(Outcome::TxRejected) => Err(Error::UserRejected),
                Some(Outcome::AddressRejected) => Err(Error::AddressRejected),
                Some(Outcome::Failed(e)) => Err(*e),
                None => Ok(Output::State {
                    state: self.tx_state(),
                    screen: 0,
                    num_screens: 0,
                }),
            },
        }
    }

    /// Wire-visible state for responses
    fn tx_state(&self) -> TxState {
        match (self.state, &self.outcome) {
            (State::AddressReview, _) => TxState::AddressReview,
            (State::TxReview, _) => TxState::TxReview,
            (_, Some(Outcome::TxRejected | Outcome::AddressRejected)) => TxState::Rejected,
            (_, Some(Outcome::Failed(_))) => TxState::Error,
            (_, Some(_)) => TxState::Approved,
            _ => TxState::Idle,
        }
    }

    fn addr_num_screens(&self) -> u8 {
        let ctx = match &self.addr_ctx {
            Some(c) => c,
            None => return 0,
        };

        let addr_pages = ctx.address.chars().count().div_ceil(PAGE_CHARS).max(1) as u8;

        // The derivation path is an extra review item in expert mode
        if self.expert {
            addr_pages + 1
        } else {
            addr_pages
        }
    }

    fn addr_screen(&self) -> Result<Screen, Error> {
        let ctx = self.addr_ctx.as_ref().ok_or(Error::UnexpectedEvent)?;

        let addr_pages = ctx.address.chars().count().div_ceil(PAGE_CHARS).max(1) as u8;
        let total = self.addr_num_screens();

        let mut title = OutKey::new();
        let mut value = crate::tx::OutVal::new();

        if self.addr_cursor < addr_pages {
            let _ = title.push_str("Address");
            if addr_pages > 1 {
                let _ = write!(title, " [{}/{}]", self.addr_cursor + 1, addr_pages);
            }
            crate::tx::page_string(ctx.address.as_str(), self.addr_cursor, &mut value)?;
        } else {
            let _ = title.push_str("HD Path");
            let _ = write!(value, "{}", ctx.path);
        }

        Ok(Screen {
            title,
            value,
            index: self.addr_cursor,
            total,
        })
    }

    fn clear_outcome(&mut self) {
        self.outcome = None;
    }

    /// Drop all signing state and scrub the accumulated transaction bytes
    fn reset_sign(&mut self) {
        self.buffer.as_mut_slice().zeroize();
        self.buffer.clear();
        self.next_seq = 0;
        self.sign_ctx = None;
        self.parsed = None;
        self.review = None;
        self.addr_ctx = None;
        self.addr_cursor = 0;
        self.state = State::Init;
    }
}
