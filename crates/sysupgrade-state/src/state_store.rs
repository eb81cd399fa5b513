// STATE STORE INTERFACE
// The account/storage view that system contract upgrades mutate
//
// SAFETY INVARIANTS:
// 1. Implementations are deterministic (same writes → same reads on every node)
// 2. `set_code` is an unconditional overwrite, never a merge
// 3. Reads observe every earlier write made through the same store

use crate::primitives::{Address, Hash};

/// Mutable, address-keyed account state.
///
/// Upgrade hooks receive `&mut dyn StateStore`, so the trait stays
/// object safe.
pub trait StateStore {
    /// Deployed code at `address`, `None` if the account has no code.
    fn code(&self, address: &Address) -> Option<Vec<u8>>;

    /// Replace the code at `address`.
    fn set_code(&mut self, address: Address, code: Vec<u8>);

    fn balance(&self, address: &Address) -> u128;

    fn set_balance(&mut self, address: Address, balance: u128);

    /// Storage slot value, `Hash::ZERO` when unset.
    fn storage(&self, address: &Address, key: &Hash) -> Hash;

    fn set_storage(&mut self, address: Address, key: Hash, value: Hash);
}
