//! Per-account claim state machine.
//!
//! # Responsibilities
//! - Check eligibility and skip empty accounts without submitting anything
//! - Obtain a gas limit per the configured estimation mode
//! - Submit the claim and classify the confirmation
//! - On revert, inflate the gas limit by one third and retry, bounded by
//!   the fee ceiling check and a hard attempt cap
//! - Forward claimed tokens when a destination is configured
//!
//! # Design Decisions
//! - Retries are an explicit bounded loop carrying an attempt counter,
//!   never recursion
//! - Every error path produces a terminal `Failed` outcome so the batch
//!   aggregate always completes
//! - A failed forwarding transfer is recorded independently and never
//!   retries the already-confirmed claim

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::time::sleep;

use crate::claim::gas::{worst_case_fee, GasEstimate, GasMode, GasPolicy, SharedGasEstimate};
use crate::claim::outcome::{ClaimOutcome, TransferOutcome, WorkerReport};
use crate::ledger::account::Account;
use crate::ledger::gateway::LedgerGateway;
use crate::ledger::types::LedgerResult;

/// Runs the claim-and-forward workflow for a single account.
pub struct ClaimWorker<G> {
    gateway: Arc<G>,
    policy: GasPolicy,
    shared_estimate: SharedGasEstimate,
}

impl<G: LedgerGateway> ClaimWorker<G> {
    pub fn new(gateway: Arc<G>, policy: GasPolicy, shared_estimate: SharedGasEstimate) -> Self {
        Self {
            gateway,
            policy,
            shared_estimate,
        }
    }

    /// Drive the account to a terminal outcome.
    pub async fn run(&self, account: &Account) -> WorkerReport {
        match self.claim_and_forward(account).await {
            Ok((claim, transfer)) => WorkerReport {
                account_id: account.id().to_string(),
                claim,
                transfer,
            },
            Err(e) => {
                tracing::error!(account = %account.id(), error = %e, "Claim aborted on error");
                WorkerReport {
                    account_id: account.id().to_string(),
                    claim: ClaimOutcome::Failed(e.to_string()),
                    transfer: None,
                }
            }
        }
    }

    async fn claim_and_forward(
        &self,
        account: &Account,
    ) -> LedgerResult<(ClaimOutcome, Option<TransferOutcome>)> {
        let claimable = self.gateway.claimable_amount(account.address()).await?;
        if claimable.is_zero() {
            tracing::info!(account = %account.id(), "Nothing to claim");
            return Ok((ClaimOutcome::Skipped("nothing to claim".to_string()), None));
        }

        let mut estimate: Option<GasEstimate> = None;

        for attempt in 1..=self.policy.max_attempts {
            let fee = self.gateway.fee_data().await?;
            let current = self.attempt_estimate(account, estimate).await?;

            let tx_hash = self
                .gateway
                .submit_claim(account, fee.gas_price, current.limit)
                .await?;
            let confirmation = self.gateway.wait_for_confirmation(tx_hash).await?;

            if confirmation.is_success() {
                tracing::info!(
                    account = %account.id(),
                    tx_hash = %tx_hash,
                    amount = %format_ether(claimable),
                    "Claim succeeded"
                );
                let transfer = match account.forward_to() {
                    Some(to) => Some(self.forward(account, to).await),
                    None => None,
                };
                return Ok((
                    ClaimOutcome::Success {
                        tx_hash,
                        amount: claimable,
                    },
                    transfer,
                ));
            }

            tracing::warn!(
                account = %account.id(),
                attempt = attempt,
                gas_limit = current.limit,
                "Claim reverted"
            );

            let inflated = current.inflated();
            estimate = Some(inflated);
            if self.policy.mode == GasMode::EstimateOnce {
                self.shared_estimate.set(inflated.limit).await;
            }

            if attempt == self.policy.max_attempts {
                break;
            }

            let cost = worst_case_fee(inflated.limit, fee.gas_price);
            if cost <= self.policy.max_fee_wei {
                tracing::debug!(account = %account.id(), gas_limit = inflated.limit, "Retrying immediately");
            } else {
                tracing::warn!(
                    account = %account.id(),
                    worst_case_fee_wei = %cost,
                    max_fee_wei = %self.policy.max_fee_wei,
                    "Worst-case fee above ceiling, delaying retry"
                );
                sleep(self.policy.retry_delay).await;
            }
        }

        Ok((
            ClaimOutcome::Failed(format!(
                "claim reverted after {} attempts",
                self.policy.max_attempts
            )),
            None,
        ))
    }

    /// Gas limit for this attempt.
    ///
    /// The first attempt follows the configured mode. After a failure the
    /// inflated value is the floor: estimate-always may re-measure, but the
    /// limit never shrinks within one account's retry sequence.
    async fn attempt_estimate(
        &self,
        account: &Account,
        prior: Option<GasEstimate>,
    ) -> LedgerResult<GasEstimate> {
        match prior {
            None => match self.policy.mode {
                GasMode::EstimateAlways => Ok(GasEstimate::measured(
                    self.gateway.estimate_claim_gas(account).await?,
                )),
                GasMode::EstimateOnce => {
                    let limit = self
                        .shared_estimate
                        .get_or_try_init(|| self.gateway.estimate_claim_gas(account))
                        .await?;
                    Ok(GasEstimate::measured(limit))
                }
                GasMode::Fixed => Ok(GasEstimate::default_limit(self.policy.default_gas_limit)),
            },
            Some(inflated) => match self.policy.mode {
                GasMode::EstimateAlways => {
                    let fresh = self.gateway.estimate_claim_gas(account).await?;
                    if fresh > inflated.limit {
                        Ok(GasEstimate::measured(fresh))
                    } else {
                        Ok(inflated)
                    }
                }
                GasMode::EstimateOnce | GasMode::Fixed => Ok(inflated),
            },
        }
    }

    /// Transfer the full token balance to the forwarding destination.
    async fn forward(&self, account: &Account, to: Address) -> TransferOutcome {
        match self.try_forward(account, to).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(account = %account.id(), error = %e, "Transfer aborted on error");
                TransferOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_forward(&self, account: &Account, to: Address) -> LedgerResult<TransferOutcome> {
        let balance = self.gateway.token_balance(account.address()).await?;
        let tx_hash = self.gateway.submit_transfer(account, to, balance).await?;
        let confirmation = self.gateway.wait_for_confirmation(tx_hash).await?;

        if confirmation.is_success() {
            tracing::info!(
                account = %account.id(),
                tx_hash = %tx_hash,
                amount = %format_ether(balance),
                "Transfer succeeded"
            );
            Ok(TransferOutcome::Success {
                tx_hash,
                amount: balance,
            })
        } else {
            tracing::warn!(account = %account.id(), "Transfer reverted");
            Ok(TransferOutcome::Failed("transfer reverted".to_string()))
        }
    }
}
