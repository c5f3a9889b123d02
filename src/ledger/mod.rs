//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Config file (accounts, contract addresses, RPC URL)
//!     → account.rs (key loading, short identifiers)
//!     → gateway.rs (RPC reads, submission, confirmation)
//! ```
//!
//! # Security Constraints
//! - Private keys are never logged; only a short key-hex prefix is surfaced
//! - All RPC calls have configurable timeouts

pub mod account;
pub mod gateway;
pub mod types;

pub use account::Account;
pub use gateway::{LedgerGateway, RpcGateway};
pub use types::{FeeData, LedgerError, LedgerResult, TxOutcome};
