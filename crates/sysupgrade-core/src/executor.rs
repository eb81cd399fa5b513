// UPGRADE EXECUTOR
// Applies the bundle a fork ships for this node's network
//
// SAFETY INVARIANTS:
// 1. Steps run strictly in declared order; step N+1 sees step N's writes
// 2. Code writes are unconditional overwrites of exactly the decoded bytes
// 3. Malformed code is rejected before the bundle touches the state store
// 4. Any failure is fatal: no partial upgrade is ever reported as success
// 5. No bundle for the network is a no-op, not an error

use crate::error::{FatalCause, FatalUpgradeError};
use crate::fork::Fork;
use crate::network::Network;
use crate::registry::UpgradeRegistry;
use crate::upgrade::{code_hash, UpgradeBundle};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sysupgrade_state::{Address, Hash, StateStore};

/// Lifecycle of one fork activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    /// Fork is not activating at this block
    NotDue,

    /// Fork activates here; looking up the bundle
    Evaluating,

    /// Nothing registered for this network
    NoUpgradeForNetwork,

    /// Steps are being applied
    Applying,

    /// Every step completed
    Applied,
}

/// What one upgrade step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub contract: Address,

    pub provenance: String,

    /// Keccak-256 of the code written, `None` for hook-only steps
    pub code_hash: Option<Hash>,

    pub ran_before_hook: bool,

    pub ran_after_hook: bool,
}

/// Outcome of applying one fork at one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeReport {
    pub fork: Fork,

    pub network: Network,

    pub block_number: u64,

    /// `NoUpgradeForNetwork` or `Applied`
    pub state: ActivationState,

    /// Bundle name, if one was registered
    pub bundle: Option<String>,

    pub steps: Vec<StepRecord>,
}

impl UpgradeReport {
    pub fn is_applied(&self) -> bool {
        self.state == ActivationState::Applied
    }
}

/// Applies registered bundles against a state store
#[derive(Debug, Clone, Copy)]
pub struct UpgradeExecutor<'a> {
    registry: &'a UpgradeRegistry,
}

impl<'a> UpgradeExecutor<'a> {
    pub fn new(registry: &'a UpgradeRegistry) -> Self {
        UpgradeExecutor { registry }
    }

    /// Apply the bundle `fork` ships on `network`.
    ///
    /// Called once per activating fork per block. `Err` means the node
    /// must stop: the state store may hold a partial upgrade.
    pub fn apply(
        &self,
        fork: Fork,
        block_number: u64,
        network: Network,
        state: &mut dyn StateStore,
    ) -> Result<UpgradeReport, FatalUpgradeError> {
        transition(fork, ActivationState::NotDue, ActivationState::Evaluating);

        let bundle = match self.registry.lookup(fork, network) {
            Some(bundle) => bundle,
            None => {
                info!(
                    "No system contract upgrade configured for {} at fork {}, height {}",
                    network, fork, block_number
                );
                transition(fork, ActivationState::Evaluating, ActivationState::NoUpgradeForNetwork);
                return Ok(UpgradeReport {
                    fork,
                    network,
                    block_number,
                    state: ActivationState::NoUpgradeForNetwork,
                    bundle: None,
                    steps: Vec::new(),
                });
            }
        };

        transition(fork, ActivationState::Evaluating, ActivationState::Applying);
        info!(
            "Apply upgrade {} on {} at height {}",
            bundle.name(),
            network,
            block_number
        );

        let steps = apply_bundle(fork, bundle, block_number, state)?;

        transition(fork, ActivationState::Applying, ActivationState::Applied);
        Ok(UpgradeReport {
            fork,
            network,
            block_number,
            state: ActivationState::Applied,
            bundle: Some(bundle.name().to_string()),
            steps,
        })
    }
}

fn transition(fork: Fork, from: ActivationState, to: ActivationState) {
    debug!("Fork {}: {:?} -> {:?}", fork, from, to);
}

fn apply_bundle(
    fork: Fork,
    bundle: &UpgradeBundle,
    block_number: u64,
    state: &mut dyn StateStore,
) -> Result<Vec<StepRecord>, FatalUpgradeError> {
    let fatal = |step: usize, contract: Address, cause: FatalCause| FatalUpgradeError {
        fork,
        bundle: bundle.name().to_string(),
        block_number,
        step,
        contract,
        cause,
    };

    // Decode everything up front so bad code never leaves a half-applied bundle.
    let mut decoded = Vec::with_capacity(bundle.steps().len());
    for (index, step) in bundle.steps().iter().enumerate() {
        let code = step
            .decode_code()
            .map_err(|e| fatal(index, step.contract(), FatalCause::CodeDecode(e)))?;
        decoded.push(code);
    }

    let mut records = Vec::with_capacity(decoded.len());

    for (index, (step, code)) in bundle.steps().iter().zip(decoded).enumerate() {
        let contract = step.contract();
        info!(
            "Upgrade contract {} to commit {}",
            contract,
            step.provenance()
        );

        if let Some(hook) = step.before_hook() {
            hook.call(block_number, contract, state)
                .map_err(|e| fatal(index, contract, FatalCause::BeforeHook(e)))?;
        }

        let written = if step.changes_code() {
            let hash = code_hash(&code);
            state.set_code(contract, code);
            info!("Contract {} code replaced, code hash {}", contract, hash);
            Some(hash)
        } else {
            info!("Contract {} code unchanged", contract);
            None
        };

        if let Some(hook) = step.after_hook() {
            hook.call(block_number, contract, state)
                .map_err(|e| fatal(index, contract, FatalCause::AfterHook(e)))?;
        }

        records.push(StepRecord {
            contract,
            provenance: step.provenance().to_string(),
            code_hash: written,
            ran_before_hook: step.before_hook().is_some(),
            ran_after_hook: step.after_hook().is_some(),
        });
    }

    Ok(records)
}
