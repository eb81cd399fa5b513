// === Upgrade Descriptors ===
pub mod fork;
pub mod network;
pub mod system_contracts;
pub mod upgrade;

// === Registry, Triggers and Execution ===
pub mod registry;
pub mod config;
pub mod trigger;
pub mod error;
pub mod executor;
pub mod orchestrator;

// === Re-exports for block processing pipelines ===
pub use fork::{Fork, UnknownFork};
pub use network::{
    Network, NetworkResolver, UnknownNetwork, MAINNET_GENESIS_HASH, TESTNET_GENESIS_HASH,
};
pub use upgrade::{code_hash, ContractUpgrade, HookError, UpgradeBundle, UpgradeHook};
pub use registry::{RegistryError, UpgradeRegistry, UpgradeRegistryBuilder};
pub use crate::config::{ChainConfig, ConfigError, ForkSchedule};
pub use trigger::activating_forks;
pub use error::{FatalCause, FatalUpgradeError};
pub use executor::{ActivationState, StepRecord, UpgradeExecutor, UpgradeReport};
pub use orchestrator::SystemContractUpgrader;

pub use sysupgrade_state::{Address, Hash, MemoryState, StateStore};

/// Build the built-in registry and resolve the node's network.
///
/// Call once at startup, after genesis is known and before the first block.
pub fn init_upgrader(genesis: &Hash) -> Result<SystemContractUpgrader, RegistryError> {
    let registry = UpgradeRegistry::builtin()?;
    Ok(SystemContractUpgrader::new(
        std::sync::Arc::new(registry),
        genesis,
        &NetworkResolver::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_upgrader_resolves_network() {
        let upgrader = init_upgrader(&TESTNET_GENESIS_HASH).unwrap();

        assert_eq!(upgrader.network(), Network::Testnet);
        assert_eq!(upgrader.registry().len(), 1);
    }
}
