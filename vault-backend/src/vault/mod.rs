//! Vault: the active directory binding and the watcher that follows it.

pub mod coalescing;
pub mod session;
pub mod watcher;

pub use coalescing::CoalescerConfig;
pub use session::VaultSession;
