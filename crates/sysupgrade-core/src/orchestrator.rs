// SYSTEM CONTRACT UPGRADE ORCHESTRATOR
// Per-block entry point: trigger evaluation + execution for every fork
//
// SAFETY INVARIANTS:
// 1. Network is resolved once, at construction, and never recomputed
// 2. The registry is shared read-only; nothing here mutates it
// 3. Activating forks apply in declared fork order
// 4. The first fatal error stops the block; later forks do not run

use crate::config::ForkSchedule;
use crate::error::FatalUpgradeError;
use crate::executor::{UpgradeExecutor, UpgradeReport};
use crate::network::{Network, NetworkResolver};
use crate::registry::UpgradeRegistry;
use crate::trigger::activating_forks;
use log::info;
use std::sync::Arc;
use sysupgrade_state::{Hash, StateStore};

/// Runs built-in system contract upgrades as blocks are processed
#[derive(Debug, Clone)]
pub struct SystemContractUpgrader {
    registry: Arc<UpgradeRegistry>,
    network: Network,
}

impl SystemContractUpgrader {
    /// Resolve the node's network from its genesis hash.
    pub fn new(registry: Arc<UpgradeRegistry>, genesis: &Hash, resolver: &NetworkResolver) -> Self {
        let network = resolver.resolve(genesis);
        info!("System contract upgrades resolved network {} from genesis {}", network, genesis);
        Self::for_network(registry, network)
    }

    pub fn for_network(registry: Arc<UpgradeRegistry>, network: Network) -> Self {
        SystemContractUpgrader { registry, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn registry(&self) -> &UpgradeRegistry {
        &self.registry
    }

    /// Apply every upgrade activating at `block_number`.
    ///
    /// Returns one report per activating fork (empty on ordinary blocks).
    /// On `Err` the caller must stop block processing.
    pub fn upgrade_build_in_system_contracts(
        &self,
        schedule: &dyn ForkSchedule,
        block_number: u64,
        state: &mut dyn StateStore,
    ) -> Result<Vec<UpgradeReport>, FatalUpgradeError> {
        let executor = UpgradeExecutor::new(&self.registry);

        activating_forks(block_number, schedule)
            .into_iter()
            .map(|fork| executor.apply(fork, block_number, self.network, state))
            .collect()
    }
}
