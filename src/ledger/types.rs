//! Ledger-specific types and error definitions.

use thiserror::Error;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within the expected window.
    #[error("Transaction not confirmed after {0} seconds")]
    ConfirmationTimeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Malformed or unexpected RPC response payload.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Current fee conditions read from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeData {
    /// Gas price in wei.
    pub gas_price: u128,
}

/// Outcome of waiting on a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Transaction was mined and succeeded.
    Confirmed { block_number: u64 },
    /// Transaction was mined but reverted (or ran out of gas).
    Reverted,
}

impl TxOutcome {
    /// Whether the transaction took effect on-chain.
    pub fn is_success(&self) -> bool {
        matches!(self, TxOutcome::Confirmed { .. })
    }
}
