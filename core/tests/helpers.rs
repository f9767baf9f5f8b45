// Copyright (c) 2018-2024 Zondax AG

#![allow(unused)]

use bitcoin::{
    bip32::{ChildNumber, DerivationPath, Xpriv},
    secp256k1::{All, Message, Secp256k1},
    Network,
};

use ledger_cosm_core::{
    dispatcher::Dispatcher,
    engine::{Driver, Engine, Error},
};
use ledger_cosm_tests::{vectors::APP_SEED, Transport};

pub fn init_logger() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// BIP-32 driver over the emulator seed phrase
pub struct TestDriver {
    secp: Secp256k1<All>,
    root: Xpriv,
}

impl TestDriver {
    pub fn from_mnemonic(phrase: &str) -> Self {
        let mnemonic = bip39::Mnemonic::from_phrase(phrase, bip39::Language::English)
            .expect("invalid mnemonic");
        let seed = bip39::Seed::new(&mnemonic, "");

        let root = Xpriv::new_master(Network::Bitcoin, seed.as_bytes()).expect("master key");

        Self {
            secp: Secp256k1::new(),
            root,
        }
    }

    fn derive(&self, path: &[u32; 5]) -> Result<Xpriv, Error> {
        let path = DerivationPath::from(
            path.iter()
                .map(|c| ChildNumber::from(*c))
                .collect::<Vec<_>>(),
        );

        self.root
            .derive_priv(&self.secp, &path)
            .map_err(|_| Error::InvalidKey)
    }
}

impl Driver for TestDriver {
    fn secp256k1_public_key(&self, path: &[u32; 5]) -> Result<[u8; 65], Error> {
        let child = self.derive(path)?;
        let pk = child.private_key.public_key(&self.secp);
        Ok(pk.serialize_uncompressed())
    }

    fn secp256k1_sign(
        &self,
        path: &[u32; 5],
        digest: &[u8; 32],
        signature: &mut [u8],
    ) -> Result<usize, Error> {
        let child = self.derive(path)?;

        let msg = Message::from_digest_slice(digest).map_err(|_| Error::SignError)?;
        let sig = self.secp.sign_ecdsa(&msg, &child.private_key);
        let der = sig.serialize_der();

        if signature.len() < der.len() {
            return Err(Error::SignError);
        }
        signature[..der.len()].copy_from_slice(&der);

        Ok(der.len())
    }
}

/// In-process transport: frames go straight through the dispatcher
pub struct TestTransport {
    dispatcher: Dispatcher<TestDriver>,
}

impl TestTransport {
    pub fn new() -> Self {
        let driver = TestDriver::from_mnemonic(APP_SEED);
        Self {
            dispatcher: Dispatcher::new(Engine::new(driver)),
        }
    }

    pub fn set_expert(&mut self, expert: bool) {
        self.dispatcher.engine_mut().set_expert(expert);
    }

    pub fn engine_mut(&mut self) -> &mut Engine<TestDriver> {
        self.dispatcher.engine_mut()
    }
}

impl Transport for TestTransport {
    type Error = std::convert::Infallible;

    fn exchange(&mut self, frame: &[u8]) -> Result<(Vec<u8>, u16), Self::Error> {
        let mut resp = [0u8; 1024];
        let n = self.dispatcher.handle(frame, &mut resp);
        assert!(n >= 2, "response missing status word");

        let sw = u16::from_be_bytes([resp[n - 2], resp[n - 1]]);
        Ok((resp[..n - 2].to_vec(), sw))
    }

    /// Walk every screen the way a reviewer would, then accept
    fn approve(&mut self) {
        let engine = self.dispatcher.engine_mut();

        loop {
            engine
                .review_screen()
                .expect("review screen failed to render");
            if !engine.review_next() {
                break;
            }
        }

        engine.approve();
    }

    fn reject(&mut self) {
        self.dispatcher.engine_mut().reject();
    }
}
