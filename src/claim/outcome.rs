//! Terminal outcomes and batch progress accounting.

use alloy::primitives::{TxHash, U256};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Terminal result of an account's claim attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Claim confirmed on-chain.
    Success { tx_hash: TxHash, amount: U256 },
    /// Claim gave up after retries or hit an unrecoverable error.
    Failed(String),
    /// Nothing to do for this account.
    Skipped(String),
}

impl ClaimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClaimOutcome::Success { .. })
    }
}

/// Result of the optional post-claim forwarding transfer.
///
/// Recorded independently of the claim outcome: a failed transfer never
/// retries or reverts the already-successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success { tx_hash: TxHash, amount: U256 },
    Failed(String),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success { .. })
    }
}

/// What a worker reports back when its account reaches a terminal state.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub account_id: String,
    pub claim: ClaimOutcome,
    pub transfer: Option<TransferOutcome>,
}

/// Final aggregate over the whole account batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub claims_succeeded: usize,
    pub transfers_succeeded: usize,
    pub accounts_completed: usize,
    pub total_accounts: usize,
}

/// Process-wide progress counters, updated as workers complete.
///
/// Atomic so concurrent worker reports never lose increments; exactly one
/// `record` call observes the batch-completing transition.
#[derive(Debug)]
pub struct ProgressCounters {
    total_accounts: usize,
    accounts_completed: AtomicUsize,
    claims_succeeded: AtomicUsize,
    transfers_succeeded: AtomicUsize,
}

impl ProgressCounters {
    pub fn new(total_accounts: usize) -> Self {
        Self {
            total_accounts,
            accounts_completed: AtomicUsize::new(0),
            claims_succeeded: AtomicUsize::new(0),
            transfers_succeeded: AtomicUsize::new(0),
        }
    }

    /// Record one terminal worker report.
    ///
    /// Returns true for exactly the report that completes the batch.
    pub fn record(&self, report: &WorkerReport) -> bool {
        if report.claim.is_success() {
            self.claims_succeeded.fetch_add(1, Ordering::SeqCst);
        }
        if matches!(report.transfer, Some(ref t) if t.is_success()) {
            self.transfers_succeeded.fetch_add(1, Ordering::SeqCst);
        }
        let done = self.accounts_completed.fetch_add(1, Ordering::SeqCst) + 1;
        done == self.total_accounts
    }

    pub fn total_accounts(&self) -> usize {
        self.total_accounts
    }

    /// Snapshot the counters into a summary.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            claims_succeeded: self.claims_succeeded.load(Ordering::SeqCst),
            transfers_succeeded: self.transfers_succeeded.load(Ordering::SeqCst),
            accounts_completed: self.accounts_completed.load(Ordering::SeqCst),
            total_accounts: self.total_accounts,
        }
    }
}
