//! Gas estimation policy and inflation arithmetic.
//!
//! # Design Decisions
//! - The estimate carries its origin so retries can tell a measured value
//!   from an inflated one
//! - Inflation grows the limit by exactly one third of its current value,
//!   compounding across retries (each failure multiplies by 4/3)
//! - In estimate-once mode a single mutex-guarded cell is shared by every
//!   worker; the first worker to need a value fills it

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::ledger::types::LedgerResult;

/// How gas limits are obtained for claim transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasMode {
    /// Measure a fresh estimate on every attempt.
    EstimateAlways,
    /// Measure once per process lifetime, shared across workers.
    EstimateOnce,
    /// Estimation disabled; use the configured default limit.
    Fixed,
}

/// Where a gas-limit value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasOrigin {
    /// Measured via an RPC gas-estimation call.
    Measured,
    /// The configured default limit.
    Default,
    /// Grown by the failure-inflation policy.
    Inflated,
}

/// A gas-limit value tagged with its origin.
///
/// Within one worker's retry sequence the limit is monotonically
/// non-decreasing: inflation only grows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub limit: u64,
    pub origin: GasOrigin,
}

impl GasEstimate {
    pub fn measured(limit: u64) -> Self {
        Self {
            limit,
            origin: GasOrigin::Measured,
        }
    }

    pub fn default_limit(limit: u64) -> Self {
        Self {
            limit,
            origin: GasOrigin::Default,
        }
    }

    /// Grow the limit by one third of its current value.
    pub fn inflated(self) -> Self {
        Self {
            limit: self.limit.saturating_add(self.limit / 3),
            origin: GasOrigin::Inflated,
        }
    }
}

/// Worst-case fee for a transaction: gas limit times gas price, in wei.
pub fn worst_case_fee(gas_limit: u64, gas_price: u128) -> u128 {
    (gas_limit as u128).saturating_mul(gas_price)
}

/// Gas-limit estimate shared across workers in estimate-once mode.
#[derive(Debug, Clone, Default)]
pub struct SharedGasEstimate {
    cell: Arc<Mutex<Option<u64>>>,
}

impl SharedGasEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared value, measuring it first if nobody has yet.
    ///
    /// The lock is held across the measurement so racing workers cannot
    /// each trigger their own estimation call.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> LedgerResult<u64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LedgerResult<u64>>,
    {
        let mut guard = self.cell.lock().await;
        if let Some(limit) = *guard {
            return Ok(limit);
        }
        let limit = init().await?;
        *guard = Some(limit);
        Ok(limit)
    }

    /// Overwrite the shared value, e.g. after inflation.
    pub async fn set(&self, limit: u64) {
        *self.cell.lock().await = Some(limit);
    }

    /// Current shared value, if any.
    pub async fn get(&self) -> Option<u64> {
        *self.cell.lock().await
    }
}

/// Retry and fee-ceiling policy applied by every worker.
#[derive(Debug, Clone)]
pub struct GasPolicy {
    /// How gas limits are obtained.
    pub mode: GasMode,
    /// Gas limit used when estimation is disabled.
    pub default_gas_limit: u64,
    /// Maximum acceptable worst-case fee per transaction, in wei.
    pub max_fee_wei: u128,
    /// Delay inserted before a retry whose worst-case fee exceeds the ceiling.
    pub retry_delay: Duration,
    /// Hard cap on claim attempts per account.
    pub max_attempts: u32,
}
