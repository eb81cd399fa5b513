// UPGRADE REGISTRY
// Fork → network → bundle table, built once at startup and frozen
//
// SAFETY INVARIANTS:
// 1. At most one bundle per (fork, network) pair
// 2. Every registered step carries decodable code
// 3. No mutation after `build()`; the frozen table has no interior mutability
// 4. A network missing for a fork means "no upgrade", never an error

use crate::fork::Fork;
use crate::network::Network;
use crate::system_contracts::H2_CONTRACT;
use crate::upgrade::{ContractUpgrade, UpgradeBundle};
use std::collections::BTreeMap;
use sysupgrade_state::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Upgrade already registered for fork {fork} on {network}")]
    DuplicateBundle { fork: Fork, network: Network },

    #[error("Invalid code for contract {contract} in upgrade {bundle}: {source}")]
    InvalidCode {
        bundle: String,
        contract: Address,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Invalid target in upgrade {bundle}: zero address")]
    ZeroAddress { bundle: String },
}

/// Mutable registration phase
#[derive(Debug, Default)]
pub struct UpgradeRegistryBuilder {
    upgrades: BTreeMap<Fork, BTreeMap<Network, UpgradeBundle>>,
}

impl UpgradeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bundle `fork` ships on `network`.
    pub fn register(
        &mut self,
        fork: Fork,
        network: Network,
        bundle: UpgradeBundle,
    ) -> Result<&mut Self, RegistryError> {
        for step in bundle.steps() {
            if step.contract() == Address::ZERO {
                return Err(RegistryError::ZeroAddress {
                    bundle: bundle.name().to_string(),
                });
            }
            step.decode_code().map_err(|source| RegistryError::InvalidCode {
                bundle: bundle.name().to_string(),
                contract: step.contract(),
                source,
            })?;
        }

        let by_network = self.upgrades.entry(fork).or_default();
        if by_network.contains_key(&network) {
            return Err(RegistryError::DuplicateBundle { fork, network });
        }
        by_network.insert(network, bundle);

        Ok(self)
    }

    pub fn build(self) -> UpgradeRegistry {
        UpgradeRegistry {
            upgrades: self.upgrades,
        }
    }
}

/// Frozen upgrade table
#[derive(Debug, Default)]
pub struct UpgradeRegistry {
    upgrades: BTreeMap<Fork, BTreeMap<Network, UpgradeBundle>>,
}

impl UpgradeRegistry {
    pub fn builder() -> UpgradeRegistryBuilder {
        UpgradeRegistryBuilder::new()
    }

    /// Registry with no upgrades at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The protocol's built-in upgrade table.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut builder = Self::builder();

        builder.register(
            Fork::H2,
            Network::Default,
            UpgradeBundle::new(
                "h2",
                vec![ContractUpgrade::migration_only(
                    H2_CONTRACT,
                    "https://github.com/binance-chain/bsc-genesis-contract/commit/f4bc161dac5937b8cbd4fe3089c7514c415430f9 fix: bas",
                )],
            ),
        )?;

        Ok(builder.build())
    }

    pub fn lookup(&self, fork: Fork, network: Network) -> Option<&UpgradeBundle> {
        self.upgrades.get(&fork).and_then(|by_network| by_network.get(&network))
    }

    /// Bundles `network` receives, in fork order.
    pub fn forks_for(&self, network: Network) -> Vec<(Fork, &UpgradeBundle)> {
        Fork::ALL
            .iter()
            .filter_map(|fork| self.lookup(*fork, network).map(|bundle| (*fork, bundle)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.upgrades.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(name: &str, code: &str) -> UpgradeBundle {
        UpgradeBundle::new(
            name,
            vec![ContractUpgrade::new(Address::from_low_u64(0xabcd), code, "test")],
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut builder = UpgradeRegistry::builder();
        builder
            .register(Fork::Bruno, Network::Mainnet, bundle("bruno-main", "6001"))
            .unwrap()
            .register(Fork::Bruno, Network::Testnet, bundle("bruno-test", "6002"))
            .unwrap();
        let registry = builder.build();

        assert_eq!(
            registry.lookup(Fork::Bruno, Network::Mainnet).unwrap().name(),
            "bruno-main"
        );
        assert_eq!(
            registry.lookup(Fork::Bruno, Network::Testnet).unwrap().name(),
            "bruno-test"
        );
        assert!(registry.lookup(Fork::Bruno, Network::Default).is_none());
        assert!(registry.lookup(Fork::Niels, Network::Mainnet).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = UpgradeRegistry::builder();
        builder
            .register(Fork::H2, Network::Default, bundle("first", "6001"))
            .unwrap();

        let err = builder
            .register(Fork::H2, Network::Default, bundle("second", "6002"))
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::DuplicateBundle {
                fork: Fork::H2,
                network: Network::Default
            }
        ));
        assert_eq!(builder.build().lookup(Fork::H2, Network::Default).unwrap().name(), "first");
    }

    #[test]
    fn test_invalid_code_rejected_at_registration() {
        let mut builder = UpgradeRegistry::builder();
        let err = builder
            .register(Fork::H2, Network::Default, bundle("broken", "0x60zz"))
            .unwrap_err();

        assert!(matches!(err, RegistryError::InvalidCode { .. }));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_zero_address_rejected() {
        let mut builder = UpgradeRegistry::builder();
        let err = builder
            .register(
                Fork::H2,
                Network::Default,
                UpgradeBundle::new("zero", vec![ContractUpgrade::new(Address::ZERO, "", "x")]),
            )
            .unwrap_err();

        assert!(matches!(err, RegistryError::ZeroAddress { .. }));
    }

    #[test]
    fn test_empty_bundle_is_allowed() {
        let mut builder = UpgradeRegistry::builder();
        builder
            .register(Fork::Niels, Network::Default, UpgradeBundle::new("noop", vec![]))
            .unwrap();

        let registry = builder.build();
        assert!(registry.lookup(Fork::Niels, Network::Default).unwrap().is_empty());
    }

    #[test]
    fn test_builtin_table() {
        let registry = UpgradeRegistry::builtin().unwrap();

        let h2 = registry.lookup(Fork::H2, Network::Default).unwrap();
        assert_eq!(h2.name(), "h2");
        assert_eq!(h2.steps().len(), 1);
        assert_eq!(h2.steps()[0].contract(), H2_CONTRACT);
        assert!(!h2.steps()[0].changes_code());

        for network in [Network::Mainnet, Network::Testnet] {
            assert!(registry.forks_for(network).is_empty());
        }
        for fork in [Fork::Ramanujan, Fork::Niels, Fork::MirrorSync, Fork::Bruno] {
            assert!(registry.lookup(fork, Network::Default).is_none());
        }
    }

    #[test]
    fn test_forks_for_follows_fork_order() {
        let mut builder = UpgradeRegistry::builder();
        builder
            .register(Fork::H2, Network::Default, bundle("h2", "6001"))
            .unwrap()
            .register(Fork::Ramanujan, Network::Default, bundle("ramanujan", "6002"))
            .unwrap();
        let registry = builder.build();

        let forks: Vec<_> = registry
            .forks_for(Network::Default)
            .into_iter()
            .map(|(fork, _)| fork)
            .collect();
        assert_eq!(forks, vec![Fork::Ramanujan, Fork::H2]);
    }
}
