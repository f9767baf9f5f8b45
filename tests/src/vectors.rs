// Copyright (c) 2018-2024 Zondax AG

//! Shared transaction vectors and device seed

use ledger_cosm_apdu::path::Bip32Path;

/// Emulator seed phrase, shared by every suite so results are reproducible
pub const APP_SEED: &str =
    "equip will roof matter pink blind book anxiety banner elbow sun young";

/// Default consumer signing path
pub fn path_cosmos() -> Bip32Path {
    Bip32Path::from_unhardened([44, 118, 0, 0, 0])
}

/// Secondary account path
pub fn path_cosmos_account(account: u32, index: u32) -> Bip32Path {
    Bip32Path::from_unhardened([44, 118, account, 0, index])
}

/// Ethereum-scheme signing path
pub fn path_evm() -> Bip32Path {
    Bip32Path::from_unhardened([44, 60, 0, 0, 0])
}

/// Path with components far above the consumer range
pub fn path_huge() -> Bip32Path {
    Bip32Path::new([
        44 | 0x8000_0000,
        118 | 0x8000_0000,
        2147483647 | 0x8000_0000,
        0,
        4294967295,
    ])
}

/// Two-message withdraw-reward transaction (canonical sign-doc form)
pub const TX_BASIC: &str = r#"{"account_number":"108","chain_id":"cosmoshub-4","fee":{"amount":[{"amount":"600","denom":"uatom"}],"gas":"200000"},"memo":"","msgs":[{"type":"cosmos-sdk/MsgWithdrawDelegationReward","value":{"delegator_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","validator_address":"cosmosvaloper1kn3wugetjuy4zetlq6wadchfhvu3x740ae6z6x"}},{"type":"cosmos-sdk/MsgWithdrawDelegationReward","value":{"delegator_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","validator_address":"cosmosvaloper1sjllsnramtg3ewxqwwrwjxfgc4n4ef9u2lcnj0"}}],"sequence":"106"}"#;

/// Single-message send transaction
pub const TX_SEND: &str = r#"{"account_number":"108","chain_id":"cosmoshub-4","fee":{"amount":[{"amount":"5000","denom":"uatom"}],"gas":"200000"},"memo":"","msgs":[{"type":"cosmos-sdk/MsgSend","value":{"amount":[{"amount":"10000","denom":"uatom"}],"from_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","to_address":"cosmos1ejrf4cur2wy6kfurg9f2jppp2h3afe5h6pkh5t"}}],"sequence":"106"}"#;

/// Basic transaction carrying unknown extra root fields, which must be
/// reviewed rather than rejected
pub const TX_EXTRA_FIELDS: &str = r#"{"account_number":"108","chain_id":"cosmoshub-4","extra_field":"empty","fee":{"amount":[{"amount":"600","denom":"uatom"}],"gas":"200000"},"foo":"bar","memo":"","msgs":[{"type":"cosmos-sdk/MsgWithdrawDelegationReward","value":{"delegator_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","validator_address":"cosmosvaloper1kn3wugetjuy4zetlq6wadchfhvu3x740ae6z6x"}}],"sequence":"106"}"#;

/// Unsorted document, rejected by canonical validation
pub const TX_UNSORTED: &str = r#"{"chain_id":"cosmoshub-4","account_number":"108","fee":{"amount":[],"gas":"1"},"memo":"","msgs":[],"sequence":"106"}"#;

/// SIGN_MODE_TEXTUAL screen list for a one-message send (emulator vector)
pub const TX_TEXTUAL_HEX: &str = "92a20168436861696e20696402686d792d636861696ea2016e4163636f756e74206e756d626572026131a2016853657175656e6365026132a301674164647265737302782d636f736d6f7331756c6176336873656e7570737771666b77327933737570356b677471776e767161386579687304f5a3016a5075626c6963206b657902781f2f636f736d6f732e63727970746f2e736563703235366b312e5075624b657904f5a3026d5075624b6579206f626a656374030104f5a401634b657902785230324542204444374620453446442045423736204443384120323035452046363544203739304320443330452038413337203541354320323532382045423341203932334120463146422034443739203444030204f5a102781e54686973207472616e73616374696f6e206861732031204d657373616765a3016d4d6573736167652028312f312902781c2f636f736d6f732e62616e6b2e763162657461312e4d736753656e640301a2026e4d736753656e64206f626a6563740302a3016c46726f6d206164647265737302782d636f736d6f7331756c6176336873656e7570737771666b77327933737570356b677471776e76716138657968730303a3016a546f206164647265737302782d636f736d6f7331656a726634637572327779366b667572673966326a707070326833616665356836706b6835740303a30166416d6f756e74026731302041544f4d0303a1026e456e64206f66204d657373616765a201644d656d6f0278193e20e29a9befb88f5c7532363942e29a9befb88f2020202020a2016446656573026a302e3030322041544f4da30169476173206c696d697402673130302730303004f5a3017148617368206f66207261772062797465730278403963303433323930313039633237306232666661396633633066613535613039306330313235656265663838316637646135333937386462663933663733383504f5";

/// Decoded form of [`TX_TEXTUAL_HEX`]
pub fn tx_textual() -> Vec<u8> {
    hex::decode(TX_TEXTUAL_HEX).expect("textual vector is valid hex")
}

/// Visible screen counts for the textual vector: 18 screens of which six
/// (Address, Public key, PubKey object, Key, Gas limit, Hash) are expert-only
pub const TX_TEXTUAL_SCREENS_EXPERT: u8 = 18;
pub const TX_TEXTUAL_SCREENS_NORMAL: u8 = 12;
