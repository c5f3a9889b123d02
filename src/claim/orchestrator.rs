//! Claim orchestration: height gate, fan-out, aggregation.
//!
//! # Responsibilities
//! - Read the claim-window start height on each fresh connection
//! - Fire the start transition exactly once when a height reaches the gate
//! - Launch one independent worker task per account
//! - Aggregate terminal reports and finish when every account is done
//!
//! # Design Decisions
//! - The gate is an atomic boolean swap: racing height events past the
//!   threshold cannot double-start the batch
//! - Height comparisons use `>=`; a reconnect may replay heights at or
//!   below values already seen and must stay a no-op
//! - Workers report over a channel; the orchestrator is the single owner
//!   of the progress counters

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::claim::gas::{GasPolicy, SharedGasEstimate};
use crate::claim::outcome::{BatchSummary, ProgressCounters, WorkerReport};
use crate::claim::worker::ClaimWorker;
use crate::ledger::account::Account;
use crate::ledger::gateway::LedgerGateway;
use crate::watcher::liveness::HeightEvent;

/// The block-height gate for the claim window.
#[derive(Debug, Clone, Copy)]
pub struct ClaimWindow {
    /// Height at which claims become permitted.
    pub start_height: u64,
    /// Most recently observed chain height.
    pub observed_height: u64,
}

/// Drives the whole claim batch from height events to a final summary.
pub struct ClaimOrchestrator<G> {
    gateway: Arc<G>,
    accounts: Vec<Account>,
    policy: GasPolicy,
    shared_estimate: SharedGasEstimate,
    window: Option<ClaimWindow>,
    started: Arc<AtomicBool>,
    counters: Arc<ProgressCounters>,
}

impl<G: LedgerGateway + 'static> ClaimOrchestrator<G> {
    pub fn new(gateway: Arc<G>, accounts: Vec<Account>, policy: GasPolicy) -> Self {
        let counters = Arc::new(ProgressCounters::new(accounts.len()));
        Self {
            gateway,
            accounts,
            policy,
            shared_estimate: SharedGasEstimate::new(),
            window: None,
            started: Arc::new(AtomicBool::new(false)),
            counters,
        }
    }

    /// Consume height events until every account reports a terminal outcome.
    pub async fn run(mut self, mut heights: mpsc::Receiver<HeightEvent>) -> BatchSummary {
        if self.accounts.is_empty() {
            tracing::warn!("No accounts configured, nothing to do");
            return self.counters.summary();
        }

        let (report_tx, mut report_rx) = mpsc::channel::<WorkerReport>(self.accounts.len());
        let mut heights_open = true;

        loop {
            tokio::select! {
                event = heights.recv(), if heights_open => match event {
                    Some(HeightEvent::Connected) => self.on_connected(&report_tx).await,
                    Some(HeightEvent::Height(height)) => self.on_height(height, &report_tx).await,
                    None => {
                        heights_open = false;
                        if !self.started.load(Ordering::SeqCst) {
                            tracing::error!("Watcher stopped before the claim window opened");
                            return self.counters.summary();
                        }
                    }
                },
                report = report_rx.recv() => {
                    let report = match report {
                        Some(r) => r,
                        // All senders gone only after every worker finished
                        None => return self.counters.summary(),
                    };
                    tracing::debug!(account = %report.account_id, "Worker finished");
                    if self.counters.record(&report) {
                        let summary = self.counters.summary();
                        tracing::info!(
                            claims_succeeded = summary.claims_succeeded,
                            transfers_succeeded = summary.transfers_succeeded,
                            accounts_completed = summary.accounts_completed,
                            total_accounts = summary.total_accounts,
                            "Batch complete"
                        );
                        return summary;
                    }
                }
            }
        }
    }

    /// A fresh watcher connection is open: read heights and evaluate the gate.
    async fn on_connected(&mut self, report_tx: &mpsc::Sender<WorkerReport>) {
        if self.started.load(Ordering::SeqCst) {
            return;
        }

        let current = match self.gateway.block_number().await {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read current block height");
                return;
            }
        };
        let start = match self.gateway.claim_window_start().await {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read claim window start");
                return;
            }
        };

        self.window = Some(ClaimWindow {
            start_height: start,
            observed_height: current,
        });
        tracing::info!(
            current_height = current,
            start_height = start,
            "Watching for claim window"
        );

        if current >= start {
            self.start_claims(report_tx);
        }
    }

    /// A new height was observed: evaluate the gate if not yet started.
    async fn on_height(&mut self, height: u64, report_tx: &mpsc::Sender<WorkerReport>) {
        if self.started.load(Ordering::SeqCst) {
            return;
        }

        let start = match self.window.as_mut() {
            Some(window) => {
                window.observed_height = height;
                window.start_height
            }
            // Height arrived before the connection-open read finished
            None => match self.gateway.claim_window_start().await {
                Ok(start) => {
                    self.window = Some(ClaimWindow {
                        start_height: start,
                        observed_height: height,
                    });
                    start
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read claim window start");
                    return;
                }
            },
        };

        if height >= start {
            tracing::info!(height = height, "Claim window open");
            self.start_claims(report_tx);
        } else if let Some(window) = self.window {
            tracing::info!(
                observed_height = window.observed_height,
                start_height = window.start_height,
                "Claim window not open yet"
            );
        }
    }

    /// Fan out one worker task per account. Idempotent.
    fn start_claims(&self, report_tx: &mpsc::Sender<WorkerReport>) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!(total_accounts = self.accounts.len(), "Starting claim workers");

        for account in &self.accounts {
            let worker = ClaimWorker::new(
                self.gateway.clone(),
                self.policy.clone(),
                self.shared_estimate.clone(),
            );
            let account = account.clone();
            let report_tx = report_tx.clone();
            tokio::spawn(async move {
                let report = worker.run(&account).await;
                let _ = report_tx.send(report).await;
            });
        }
    }
}
