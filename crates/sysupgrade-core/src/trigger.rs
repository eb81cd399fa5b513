use crate::config::ForkSchedule;
use crate::fork::Fork;

/// Forks activating at exactly `block_number`, in declared fork order.
///
/// Empty at every height except configured activation heights.
pub fn activating_forks(block_number: u64, schedule: &dyn ForkSchedule) -> Vec<Fork> {
    Fork::ALL
        .iter()
        .copied()
        .filter(|fork| schedule.is_fork_activation_block(*fork, block_number))
        .collect()
}
