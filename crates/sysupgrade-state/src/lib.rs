// === Account State Primitives ===
pub mod primitives;
pub mod state_store;
pub mod memory;

// === Re-exports for upgrade consumers ===
pub use primitives::{strip_hex_prefix, Address, Hash, ParseError};
pub use state_store::StateStore;
pub use memory::{Account, MemoryState};
