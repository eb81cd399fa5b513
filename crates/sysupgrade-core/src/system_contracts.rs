//! Fixed addresses of the protocol's system contracts.

use sysupgrade_state::Address;

pub const STAKING_CONTRACT: Address = Address::from_low_u64(0x1000);
pub const SLASHING_INDICATOR_CONTRACT: Address = Address::from_low_u64(0x1001);
pub const SYSTEM_REWARD_CONTRACT: Address = Address::from_low_u64(0x1002);
pub const STAKING_POOL_CONTRACT: Address = Address::from_low_u64(0x7001);
pub const GOVERNANCE_CONTRACT: Address = Address::from_low_u64(0x7002);
pub const CHAIN_CONFIG_CONTRACT: Address = Address::from_low_u64(0x7003);
pub const RUNTIME_UPGRADE_CONTRACT: Address = Address::from_low_u64(0x7004);
pub const DEPLOYER_PROXY_CONTRACT: Address = Address::from_low_u64(0x7005);

/// Target of the `h2` upgrade.
pub const H2_CONTRACT: Address = RUNTIME_UPGRADE_CONTRACT;

/// Every system contract with its display name.
pub const SYSTEM_CONTRACTS: [(&str, Address); 8] = [
    ("Staking", STAKING_CONTRACT),
    ("SlashingIndicator", SLASHING_INDICATOR_CONTRACT),
    ("SystemReward", SYSTEM_REWARD_CONTRACT),
    ("StakingPool", STAKING_POOL_CONTRACT),
    ("Governance", GOVERNANCE_CONTRACT),
    ("ChainConfig", CHAIN_CONFIG_CONTRACT),
    ("RuntimeUpgrade", RUNTIME_UPGRADE_CONTRACT),
    ("DeployerProxy", DEPLOYER_PROXY_CONTRACT),
];

pub fn is_system_contract(address: &Address) -> bool {
    SYSTEM_CONTRACTS.iter().any(|(_, a)| a == address)
}
