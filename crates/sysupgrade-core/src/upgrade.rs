// UPGRADE DESCRIPTORS
// A single system contract change and the named bundle a fork ships
//
// SAFETY INVARIANTS:
// 1. Descriptors are immutable once constructed
// 2. Step order inside a bundle is execution order
// 3. Empty code means "leave the deployed code alone", hooks still run

use sha3::{Digest, Keccak256};
use std::fmt;
use std::sync::Arc;
use sysupgrade_state::{strip_hex_prefix, Address, Hash, StateStore};
use thiserror::Error;

/// Failure reported by a migration hook
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HookError {
    pub message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        HookError {
            message: message.into(),
        }
    }
}

/// Migration logic run immediately before or after a code replacement.
///
/// Hooks must be deterministic: no clocks, no randomness, no environment.
pub trait UpgradeHook: Send + Sync {
    fn call(
        &self,
        block_number: u64,
        contract: Address,
        state: &mut dyn StateStore,
    ) -> Result<(), HookError>;
}

impl<F> UpgradeHook for F
where
    F: Fn(u64, Address, &mut dyn StateStore) -> Result<(), HookError> + Send + Sync,
{
    fn call(
        &self,
        block_number: u64,
        contract: Address,
        state: &mut dyn StateStore,
    ) -> Result<(), HookError> {
        self(block_number, contract, state)
    }
}

/// Keccak-256 of deployed code
pub fn code_hash(code: &[u8]) -> Hash {
    Hash(Keccak256::digest(code).into())
}

/// One contract change inside an upgrade
#[derive(Clone)]
pub struct ContractUpgrade {
    /// Contract whose code is replaced
    contract: Address,

    /// Replacement runtime code, hex encoded (empty = no code change)
    code: String,

    /// Where the code comes from (commit URL and note)
    provenance: String,

    before_upgrade: Option<Arc<dyn UpgradeHook>>,

    after_upgrade: Option<Arc<dyn UpgradeHook>>,
}

impl ContractUpgrade {
    pub fn new(contract: Address, code: impl Into<String>, provenance: impl Into<String>) -> Self {
        ContractUpgrade {
            contract,
            code: code.into(),
            provenance: provenance.into(),
            before_upgrade: None,
            after_upgrade: None,
        }
    }

    /// Hook-only step: hooks run, deployed code is left as is.
    pub fn migration_only(contract: Address, provenance: impl Into<String>) -> Self {
        Self::new(contract, "", provenance)
    }

    pub fn before_upgrade<F>(self, hook: F) -> Self
    where
        F: Fn(u64, Address, &mut dyn StateStore) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.with_before_hook(Arc::new(hook))
    }

    pub fn after_upgrade<F>(self, hook: F) -> Self
    where
        F: Fn(u64, Address, &mut dyn StateStore) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.with_after_hook(Arc::new(hook))
    }

    pub fn with_before_hook(mut self, hook: Arc<dyn UpgradeHook>) -> Self {
        self.before_upgrade = Some(hook);
        self
    }

    pub fn with_after_hook(mut self, hook: Arc<dyn UpgradeHook>) -> Self {
        self.after_upgrade = Some(hook);
        self
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn before_hook(&self) -> Option<&dyn UpgradeHook> {
        self.before_upgrade.as_deref()
    }

    pub fn after_hook(&self) -> Option<&dyn UpgradeHook> {
        self.after_upgrade.as_deref()
    }

    /// Whether applying this step writes code at all
    pub fn changes_code(&self) -> bool {
        !strip_hex_prefix(&self.code).is_empty()
    }

    /// Decode the replacement code. An optional `0x` prefix is accepted.
    pub fn decode_code(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(strip_hex_prefix(&self.code))
    }
}

impl fmt::Debug for ContractUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractUpgrade")
            .field("contract", &self.contract)
            .field("code_len", &(strip_hex_prefix(&self.code).len() / 2))
            .field("provenance", &self.provenance)
            .field("before_upgrade", &self.before_upgrade.is_some())
            .field("after_upgrade", &self.after_upgrade.is_some())
            .finish()
    }
}

/// Named, ordered set of contract changes shipped by one fork
#[derive(Debug, Clone)]
pub struct UpgradeBundle {
    name: String,
    steps: Vec<ContractUpgrade>,
}

impl UpgradeBundle {
    pub fn new(name: impl Into<String>, steps: Vec<ContractUpgrade>) -> Self {
        UpgradeBundle {
            name: name.into(),
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[ContractUpgrade] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
