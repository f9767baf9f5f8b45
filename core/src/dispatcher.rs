// Copyright (c) 2018-2024 Zondax AG

//! Frame-level command dispatcher
//!
//! Decodes command frames, routes them through the [Engine], and frames the
//! result (payload plus trailing status word) for the transport. All failure
//! paths reduce to a status word here; decode failures additionally carry
//! their description in the response body so hosts can surface the reason.

use ledger_cosm_apdu::{
    status::{StatusTable, StatusWord},
    ApduError, Instruction, APDU_HEADER_LEN, COSM_APDU_CLA,
};

use crate::engine::{Driver, Engine, Error, Event};

/// Command dispatcher wrapping an [Engine]
pub struct Dispatcher<DRV: Driver> {
    engine: Engine<DRV>,
    table: StatusTable,
}

impl<DRV: Driver> Dispatcher<DRV> {
    /// Create a dispatcher with the current status-word revision
    pub fn new(engine: Engine<DRV>) -> Self {
        Self::with_table(engine, StatusTable::default())
    }

    /// Create a dispatcher with an explicit status-word revision
    pub fn with_table(engine: Engine<DRV>, table: StatusTable) -> Self {
        Self { engine, table }
    }

    /// Access the wrapped engine (display / input layer)
    pub fn engine(&self) -> &Engine<DRV> {
        &self.engine
    }

    /// Mutable access to the wrapped engine (display / input layer)
    pub fn engine_mut(&mut self) -> &mut Engine<DRV> {
        &mut self.engine
    }

    /// Process one command frame
    ///
    /// Writes the response payload and trailing status word into `resp` and
    /// returns the total response length. Never panics on malformed input;
    /// every failure becomes a status word.
    pub fn handle(&mut self, frame: &[u8], resp: &mut [u8]) -> usize {
        if resp.len() < 2 {
            return 0;
        }

        let mut n = 0usize;
        let sw = match self.process(frame, resp) {
            Ok(len) => {
                n = len;
                StatusWord::Ok
            }
            Err(Failure::Status(sw)) => sw,
            Err(Failure::Engine(e)) => {
                #[cfg(feature = "log")]
                log::warn!("command failed: {:?}", e);

                n = self.error_body(&e, resp);
                self.status_for(&e)
            }
        };

        sw.append(resp, n)
    }

    fn process(&mut self, frame: &[u8], resp: &mut [u8]) -> Result<usize, Failure> {
        if frame.len() < APDU_HEADER_LEN {
            return Err(Failure::Status(StatusWord::WrongLength));
        }

        if frame[0] != COSM_APDU_CLA {
            return Err(Failure::Status(StatusWord::ClaNotSupported));
        }

        let ins = frame[1];
        if Instruction::try_from(ins).is_err() {
            return Err(Failure::Status(StatusWord::InsNotSupported));
        }

        let len = frame[4] as usize;
        let data = &frame[APDU_HEADER_LEN..];
        if data.len() != len {
            return Err(Failure::Status(StatusWord::WrongLength));
        }

        let evt = Event::parse(ins, data).map_err(|e| {
            Failure::Status(match e {
                ApduError::InvalidLength => StatusWord::WrongLength,
                _ => StatusWord::DataInvalid,
            })
        })?;

        let out = self.engine.update(&evt).map_err(Failure::Engine)?;

        let capacity = resp.len() - 2;
        out.encode(&mut resp[..capacity])
            .map_err(|_| Failure::Engine(Error::OutputTooSmall))
    }

    /// Decode failures carry their description in the response body
    fn error_body(&self, e: &Error, resp: &mut [u8]) -> usize {
        let msg = match e {
            Error::Parser(p) => p.description().as_bytes(),
            _ => return 0,
        };

        let n = msg.len().min(resp.len() - 2);
        resp[..n].copy_from_slice(&msg[..n]);
        n
    }

    fn status_for(&self, e: &Error) -> StatusWord {
        match e {
            Error::InvalidLength => StatusWord::WrongLength,
            Error::UnexpectedEvent => StatusWord::CommandNotAllowed,
            Error::Busy => StatusWord::CommandNotAllowed,
            Error::ChainNotSupported => StatusWord::ChainConfigNotSupported,
            Error::InvalidPathCoin => StatusWord::InvalidPathCoin,
            Error::InvalidPathValue => self.table.invalid_path_value(),
            Error::ExpertRequired => StatusWord::DataInvalid,
            Error::Parser(_) => StatusWord::DataInvalid,
            Error::ChunkOutOfOrder => StatusWord::ChunkOutOfOrder,
            Error::BufferFull => StatusWord::BufferCapacityExceeded,
            Error::UserRejected => StatusWord::ConditionsNotSatisfied,
            Error::AddressRejected => StatusWord::DataInvalid,
            Error::InvalidKey => StatusWord::DataInvalid,
            Error::SignError => StatusWord::ExecutionError,
            Error::OutputTooSmall => StatusWord::OutputBufferTooSmall,
        }
    }
}

enum Failure {
    Status(StatusWord),
    Engine(Error),
}
