use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sysupgrade_core::{
    code_hash, ChainConfig, Fork, Hash, MemoryState, Network, NetworkResolver,
    SystemContractUpgrader, UpgradeRegistry, UpgradeReport,
};
use sysupgrade_state::Address;

#[derive(Parser)]
#[command(name = "sysupgrade")]
#[command(about = "System contract upgrade planner and dry-run tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve which network a genesis hash belongs to
    Resolve {
        #[arg(long)]
        genesis: Hash,
    },

    /// Print the built-in upgrade table
    Plan {
        /// Only show upgrades for this network
        #[arg(long)]
        network: Option<Network>,
    },

    /// Replay a block range against an empty in-memory state
    Replay {
        /// Chain config file with fork activation blocks
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        genesis: Hash,

        #[arg(long, default_value_t = 0)]
        from: u64,

        #[arg(long)]
        to: u64,
    },
}

#[derive(Serialize)]
struct PlannedStep {
    contract: Address,
    provenance: String,
    code_size: usize,
    code_hash: Option<Hash>,
    before_hook: bool,
    after_hook: bool,
}

#[derive(Serialize)]
struct PlannedUpgrade {
    fork: Fork,
    network: Network,
    bundle: String,
    steps: Vec<PlannedStep>,
}

#[derive(Serialize)]
struct ReplayReport {
    network: Network,
    from: u64,
    to: u64,
    upgrades: Vec<UpgradeReport>,
    state_fingerprint: Hash,
    state: MemoryState,
}

fn plan(registry: &UpgradeRegistry, only: Option<Network>) -> Result<Vec<PlannedUpgrade>> {
    let networks: Vec<Network> = match only {
        Some(network) => vec![network],
        None => Network::ALL.to_vec(),
    };

    let mut planned = Vec::new();
    for network in networks {
        for (fork, bundle) in registry.forks_for(network) {
            let mut steps = Vec::with_capacity(bundle.steps().len());
            for step in bundle.steps() {
                let code = step
                    .decode_code()
                    .with_context(|| format!("decoding code for {}", step.contract()))?;
                steps.push(PlannedStep {
                    contract: step.contract(),
                    provenance: step.provenance().to_string(),
                    code_size: code.len(),
                    code_hash: step.changes_code().then(|| code_hash(&code)),
                    before_hook: step.before_hook().is_some(),
                    after_hook: step.after_hook().is_some(),
                });
            }
            planned.push(PlannedUpgrade {
                fork,
                network,
                bundle: bundle.name().to_string(),
                steps,
            });
        }
    }
    Ok(planned)
}

fn replay(config: PathBuf, genesis: Hash, from: u64, to: u64) -> Result<ReplayReport> {
    ensure!(from <= to, "--from ({}) must not exceed --to ({})", from, to);

    let chain_config = ChainConfig::load(&config)
        .with_context(|| format!("loading chain config {}", config.display()))?;
    let registry = Arc::new(UpgradeRegistry::builtin()?);
    let upgrader = SystemContractUpgrader::new(registry, &genesis, &NetworkResolver::default());

    info!(
        "Replaying blocks {}..={} on {} with {:?}",
        from,
        to,
        upgrader.network(),
        chain_config
    );

    let mut state = MemoryState::new();
    let mut upgrades = Vec::new();
    for block in from..=to {
        match upgrader.upgrade_build_in_system_contracts(&chain_config, block, &mut state) {
            Ok(reports) => upgrades.extend(reports),
            Err(fatal) => {
                error!("Block processing halted: {}", fatal);
                return Err(fatal.into());
            }
        }
    }

    Ok(ReplayReport {
        network: upgrader.network(),
        from,
        to,
        upgrades,
        state_fingerprint: state.fingerprint(),
        state,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { genesis } => {
            let network = NetworkResolver::default().resolve(&genesis);
            println!("{}", network);
        }
        Commands::Plan { network } => {
            let registry = UpgradeRegistry::builtin()?;
            println!("{}", serde_json::to_string_pretty(&plan(&registry, network)?)?);
        }
        Commands::Replay {
            config,
            genesis,
            from,
            to,
        } => {
            let report = replay(config, genesis, from, to)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use sysupgrade_core::system_contracts::H2_CONTRACT;

    #[test]
    fn test_plan_lists_builtin_h2() {
        let registry = UpgradeRegistry::builtin().unwrap();

        let all = plan(&registry, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].fork, Fork::H2);
        assert_eq!(all[0].network, Network::Default);
        assert_eq!(all[0].steps[0].contract, H2_CONTRACT);
        assert_eq!(all[0].steps[0].code_hash, None);

        assert!(plan(&registry, Some(Network::Mainnet)).unwrap().is_empty());
    }

    #[test]
    fn test_replay_reports_h2() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "h2_block = 4").unwrap();

        let report = replay(file.path().to_path_buf(), Hash::from_low_u64(1), 0, 10).unwrap();

        assert_eq!(report.network, Network::Default);
        assert_eq!(report.upgrades.len(), 1);
        assert_eq!(report.upgrades[0].block_number, 4);
        assert!(report.state.is_empty());
    }

    #[test]
    fn test_replay_rejects_inverted_range() {
        assert!(replay(PathBuf::from("unused.toml"), Hash::ZERO, 5, 1).is_err());
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::try_parse_from([
            "sysupgrade",
            "replay",
            "--config",
            "chain.toml",
            "--genesis",
            "0x0d21840abff46b96c84b2ac9e10e4f5cdaeb5693cb665db62a2f3b02d2d57b5b",
            "--to",
            "100",
        ])
        .unwrap();

        match cli.command {
            Commands::Replay { genesis, from, to, .. } => {
                assert_eq!(NetworkResolver::default().resolve(&genesis), Network::Mainnet);
                assert_eq!(from, 0);
                assert_eq!(to, 100);
            }
            _ => panic!("expected replay"),
        }
    }
}
