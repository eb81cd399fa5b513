// NETWORK RESOLUTION
// Maps a chain's genesis hash to the deployment it belongs to
//
// SAFETY INVARIANTS:
// 1. Resolution is a pure function of the genesis hash
// 2. Anything not recognised is `Network::Default`
// 3. The result is computed once, before the first block, and never changes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use sysupgrade_state::Hash;
use thiserror::Error;

/// Genesis hash of the public main network.
pub const MAINNET_GENESIS_HASH: Hash = Hash([
    0x0d, 0x21, 0x84, 0x0a, 0xbf, 0xf4, 0x6b, 0x96,
    0xc8, 0x4b, 0x2a, 0xc9, 0xe1, 0x0e, 0x4f, 0x5c,
    0xda, 0xeb, 0x56, 0x93, 0xcb, 0x66, 0x5d, 0xb6,
    0x2a, 0x2f, 0x3b, 0x02, 0xd2, 0xd5, 0x7b, 0x5b,
]);

/// Genesis hash of the public test network.
pub const TESTNET_GENESIS_HASH: Hash = Hash([
    0x6d, 0x3c, 0x66, 0xc5, 0x35, 0x7e, 0xc9, 0x1d,
    0x5c, 0x43, 0xaf, 0x47, 0xe2, 0x34, 0xa9, 0x39,
    0xb2, 0x25, 0x57, 0xcb, 0xb5, 0x52, 0xdc, 0x45,
    0xbe, 0xbb, 0xce, 0xee, 0xd9, 0x0f, 0xbe, 0x34,
]);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown network: {0}")]
pub struct UnknownNetwork(pub String);

/// Deployment a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Well-known public main network
    Mainnet,

    /// Well-known public test network
    Testnet,

    /// Private deployments and anything else
    Default,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Default];

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Testnet",
            Network::Default => "Default",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .iter()
            .copied()
            .find(|n| n.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

/// Genesis hash → network lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResolver {
    mainnet_genesis: Hash,
    testnet_genesis: Hash,
}

impl NetworkResolver {
    pub fn new(mainnet_genesis: Hash, testnet_genesis: Hash) -> Self {
        NetworkResolver {
            mainnet_genesis,
            testnet_genesis,
        }
    }

    pub fn resolve(&self, genesis: &Hash) -> Network {
        if *genesis == self.mainnet_genesis {
            Network::Mainnet
        } else if *genesis == self.testnet_genesis {
            Network::Testnet
        } else {
            Network::Default
        }
    }
}

impl Default for NetworkResolver {
    fn default() -> Self {
        Self::new(MAINNET_GENESIS_HASH, TESTNET_GENESIS_HASH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_well_known_networks() {
        let resolver = NetworkResolver::default();

        assert_eq!(resolver.resolve(&MAINNET_GENESIS_HASH), Network::Mainnet);
        assert_eq!(resolver.resolve(&TESTNET_GENESIS_HASH), Network::Testnet);
    }

    #[test]
    fn test_unknown_genesis_is_default() {
        let resolver = NetworkResolver::default();

        assert_eq!(resolver.resolve(&Hash::ZERO), Network::Default);
        assert_eq!(resolver.resolve(&Hash::from_low_u64(42)), Network::Default);
    }

    #[test]
    fn test_custom_resolver() {
        let resolver = NetworkResolver::new(Hash::from_low_u64(1), Hash::from_low_u64(2));

        assert_eq!(resolver.resolve(&Hash::from_low_u64(1)), Network::Mainnet);
        assert_eq!(resolver.resolve(&Hash::from_low_u64(2)), Network::Testnet);
        assert_eq!(resolver.resolve(&MAINNET_GENESIS_HASH), Network::Default);
    }

    #[test]
    fn test_genesis_constants_match_text() {
        assert_eq!(
            MAINNET_GENESIS_HASH.to_string(),
            "0x0d21840abff46b96c84b2ac9e10e4f5cdaeb5693cb665db62a2f3b02d2d57b5b"
        );
        assert_eq!(
            TESTNET_GENESIS_HASH.to_string(),
            "0x6d3c66c5357ec91d5c43af47e234a939b22557cbb552dc45bebbceeed90fbe34"
        );
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("DEFAULT".parse::<Network>().unwrap(), Network::Default);
        assert!("devnet".parse::<Network>().is_err());
    }
}
