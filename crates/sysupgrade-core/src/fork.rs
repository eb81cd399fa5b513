// HARD FORKS
// Closed set of forks that can carry system contract upgrades
//
// The declaration order below is consensus-critical: when several forks
// activate at the same height their upgrades apply in this order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown fork: {0}")]
pub struct UnknownFork(pub String);

/// Height-gated protocol change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fork {
    Ramanujan,
    Niels,
    MirrorSync,
    Bruno,
    H2,
}

impl Fork {
    /// Every fork, in activation order.
    pub const ALL: [Fork; 5] = [
        Fork::Ramanujan,
        Fork::Niels,
        Fork::MirrorSync,
        Fork::Bruno,
        Fork::H2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fork::Ramanujan => "ramanujan",
            Fork::Niels => "niels",
            Fork::MirrorSync => "mirrorSync",
            Fork::Bruno => "bruno",
            Fork::H2 => "h2",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fork {
    type Err = UnknownFork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fork::ALL
            .iter()
            .copied()
            .find(|fork| fork.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFork(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_order_matches_ord() {
        let mut sorted = Fork::ALL;
        sorted.sort();
        assert_eq!(sorted, Fork::ALL);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("H2".parse::<Fork>().unwrap(), Fork::H2);
        assert_eq!("mirrorsync".parse::<Fork>().unwrap(), Fork::MirrorSync);
        assert_eq!(
            "berlin".parse::<Fork>(),
            Err(UnknownFork("berlin".to_string()))
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        for fork in Fork::ALL {
            let json = serde_json::to_string(&fork).unwrap();
            assert_eq!(json, format!("\"{}\"", fork));
        }
    }
}
