use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

use crate::primitives::{Address, Hash};
use crate::state_store::StateStore;

/// **Single account: code, balance and storage slots**
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    #[serde(with = "hex_bytes")]
    pub code: Vec<u8>,
    pub balance: u128,
    pub storage: BTreeMap<Hash, Hash>,
}

impl Account {
    fn is_empty(&self) -> bool {
        self.code.is_empty() && self.balance == 0 && self.storage.is_empty()
    }
}

/// **In-memory account state (ordered, so every traversal is deterministic)**
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    accounts: BTreeMap<Address, Account>,
}

impl MemoryState {
    pub fn new() -> Self {
        MemoryState {
            accounts: BTreeMap::new(),
        }
    }

    /// **Retrieves an account, if it holds anything**
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// **Generates a Keccak-256 fingerprint of the whole state**
    ///
    /// Two stores that went through the same writes in the same order
    /// produce the same fingerprint.
    pub fn fingerprint(&self) -> Hash {
        let mut hasher = Keccak256::new();
        for (address, account) in &self.accounts {
            hasher.update(address.as_bytes());
            hasher.update((account.code.len() as u64).to_be_bytes());
            hasher.update(&account.code);
            hasher.update(account.balance.to_be_bytes());
            for (key, value) in &account.storage {
                hasher.update(key.as_bytes());
                hasher.update(value.as_bytes());
            }
        }
        Hash(hasher.finalize().into())
    }

    fn prune(&mut self, address: &Address) {
        if self.accounts.get(address).map_or(false, Account::is_empty) {
            self.accounts.remove(address);
        }
    }
}

impl StateStore for MemoryState {
    fn code(&self, address: &Address) -> Option<Vec<u8>> {
        self.accounts
            .get(address)
            .filter(|a| !a.code.is_empty())
            .map(|a| a.code.clone())
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) {
        self.accounts.entry(address).or_default().code = code;
        self.prune(&address);
    }

    fn balance(&self, address: &Address) -> u128 {
        self.accounts.get(address).map_or(0, |a| a.balance)
    }

    fn set_balance(&mut self, address: Address, balance: u128) {
        self.accounts.entry(address).or_default().balance = balance;
        self.prune(&address);
    }

    fn storage(&self, address: &Address, key: &Hash) -> Hash {
        self.accounts
            .get(address)
            .and_then(|a| a.storage.get(key))
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    fn set_storage(&mut self, address: Address, key: Hash, value: Hash) {
        let account = self.accounts.entry(address).or_default();
        if value.is_zero() {
            account.storage.remove(&key);
        } else {
            account.storage.insert(key, value);
        }
        self.prune(&address);
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(crate::primitives::strip_hex_prefix(&s)).map_err(serde::de::Error::custom)
    }
}
