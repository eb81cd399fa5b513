// CHAIN CONFIGURATION
// Per-fork activation heights and the edge-triggered activation predicate
//
// SAFETY INVARIANTS:
// 1. A fork activates at exactly one height: the configured one
// 2. A fork with no configured height never activates
// 3. Unknown keys fail the load instead of leaving a fork unscheduled

use crate::fork::Fork;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix for overriding file settings
pub const ENV_PREFIX: &str = "SYSUPGRADE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load chain config: {0}")]
    Load(#[from] config::ConfigError),
}

/// Answers "does `fork` activate at exactly `block_number`?"
pub trait ForkSchedule {
    fn is_fork_activation_block(&self, fork: Fork, block_number: u64) -> bool;
}

/// Fork activation heights
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    pub ramanujan_block: Option<u64>,
    pub niels_block: Option<u64>,
    pub mirror_sync_block: Option<u64>,
    pub bruno_block: Option<u64>,
    pub h2_block: Option<u64>,
}

impl ChainConfig {
    /// Load from a file (format from its extension), then apply
    /// `SYSUPGRADE_*` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn activation_block(&self, fork: Fork) -> Option<u64> {
        match fork {
            Fork::Ramanujan => self.ramanujan_block,
            Fork::Niels => self.niels_block,
            Fork::MirrorSync => self.mirror_sync_block,
            Fork::Bruno => self.bruno_block,
            Fork::H2 => self.h2_block,
        }
    }

    pub fn with_activation(mut self, fork: Fork, block_number: u64) -> Self {
        let slot = match fork {
            Fork::Ramanujan => &mut self.ramanujan_block,
            Fork::Niels => &mut self.niels_block,
            Fork::MirrorSync => &mut self.mirror_sync_block,
            Fork::Bruno => &mut self.bruno_block,
            Fork::H2 => &mut self.h2_block,
        };
        *slot = Some(block_number);
        self
    }
}

impl ForkSchedule for ChainConfig {
    fn is_fork_activation_block(&self, fork: Fork, block_number: u64) -> bool {
        self.activation_block(fork) == Some(block_number)
    }
}
