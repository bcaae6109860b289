//! Process-local state stores
//!
//! Handlers only see the traits, so sessions, wallets and processed update ids
//! can move to an external store without touching call sites. The in-memory
//! implementations here bound what can be bounded: sessions and update ids
//! expire, wallets do not (dropping a key would strand its funds).

pub mod chat_lock;
pub mod ledger;
pub mod sessions;
pub mod wallets;

pub use chat_lock::ChatLocks;
pub use ledger::{MemoryUpdateLedger, UpdateLedger};
pub use sessions::{MemorySessionStore, SessionStore};
pub use wallets::{MemoryWalletStore, WalletStore};
