// FATAL UPGRADE ERRORS
//
// A system contract upgrade either completes or stops the node. These
// types never convert into the recoverable errors used elsewhere: a block
// pipeline receiving a `FatalUpgradeError` must stop processing blocks.

use crate::fork::Fork;
use crate::upgrade::HookError;
use log::error;
use sysupgrade_state::Address;
use thiserror::Error;

/// What went wrong inside an upgrade step
#[derive(Debug, Error)]
pub enum FatalCause {
    #[error("before-upgrade hook failed: {0}")]
    BeforeHook(HookError),

    #[error("failed to decode new contract code: {0}")]
    CodeDecode(hex::FromHexError),

    #[error("after-upgrade hook failed: {0}")]
    AfterHook(HookError),
}

/// Unrecoverable failure while applying a system contract upgrade
#[derive(Debug, Error)]
#[must_use = "a failed system contract upgrade must stop block processing"]
#[error(
    "system contract upgrade {bundle} (fork {fork}) failed at block {block_number}, \
     step {step}, contract {contract}: {cause}"
)]
pub struct FatalUpgradeError {
    pub fork: Fork,
    pub bundle: String,
    pub block_number: u64,
    /// Zero-based index of the failing step
    pub step: usize,
    pub contract: Address,
    pub cause: FatalCause,
}

impl FatalUpgradeError {
    /// Log at error level, then panic with the error message.
    ///
    /// For pipelines that cannot propagate the error. Callers must not catch
    /// the unwind; node binaries should set `panic = "abort"` so a panic on a
    /// worker thread still stops the process.
    pub fn halt(self) -> ! {
        error!("HALTING NODE: {}", self);
        panic!("{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FatalUpgradeError {
        FatalUpgradeError {
            fork: Fork::H2,
            bundle: "h2".to_string(),
            block_number: 1000,
            step: 0,
            contract: Address::from_low_u64(0xabcd),
            cause: FatalCause::BeforeHook(HookError::new("balance underflow")),
        }
    }

    #[test]
    fn test_message_identifies_step() {
        let msg = sample().to_string();

        assert!(msg.contains("fork h2"));
        assert!(msg.contains("block 1000"));
        assert!(msg.contains("0x000000000000000000000000000000000000abcd"));
        assert!(msg.contains("before-upgrade hook failed: balance underflow"));
    }

    #[test]
    #[should_panic(expected = "balance underflow")]
    fn test_halt_panics() {
        sample().halt();
    }

    #[test]
    fn test_halt_panics_with_full_message() {
        let expected = sample().to_string();

        let payload = std::panic::catch_unwind(|| {
            sample().halt();
        })
        .unwrap_err();

        assert_eq!(payload.downcast_ref::<String>(), Some(&expected));
    }
}
