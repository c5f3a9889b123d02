//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::claim::gas::{GasMode, GasPolicy};

/// Root configuration for the claimer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClaimerConfig {
    /// RPC endpoints and connection liveness timing.
    pub network: NetworkConfig,

    /// Contract addresses and claim retry settings.
    pub claim: ClaimConfig,

    /// Gas estimation mode and fee ceiling.
    pub gas: GasConfig,

    /// Accounts to claim for.
    pub accounts: Vec<AccountConfig>,
}

impl ClaimerConfig {
    /// Derive the worker gas policy from the gas and claim sections.
    pub fn gas_policy(&self) -> GasPolicy {
        GasPolicy {
            mode: self.gas.mode(),
            default_gas_limit: self.gas.default_gas_limit,
            max_fee_wei: self.gas.max_fee_wei(),
            retry_delay: Duration::from_millis(self.claim.retry_delay_ms),
            max_attempts: self.claim.max_attempts,
        }
    }
}

/// Network endpoints and liveness timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint for reads and submission.
    pub rpc_http_url: String,

    /// WebSocket endpoint for the new-heads subscription.
    pub rpc_wss_url: String,

    /// Per-call RPC timeout.
    pub rpc_timeout_secs: u64,

    /// Interval between liveness pings.
    pub keep_alive_interval_ms: u64,

    /// How long to wait for a pong before force-closing the connection.
    pub expected_pong_ms: u64,

    /// Base delay for reconnect backoff.
    pub reconnect_base_ms: u64,

    /// Ceiling for reconnect backoff.
    pub reconnect_max_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_http_url: "http://localhost:8545".to_string(),
            rpc_wss_url: "ws://localhost:8546".to_string(),
            rpc_timeout_secs: 10,
            keep_alive_interval_ms: 5_000,
            expected_pong_ms: 10_000,
            reconnect_base_ms: 1_000,
            reconnect_max_ms: 30_000,
        }
    }
}

/// Claim contract addresses and retry settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClaimConfig {
    /// Token distributor contract address.
    pub distributor_address: String,

    /// ERC-20 token contract address.
    pub token_address: String,

    /// Upper bound on waiting for a transaction to be mined.
    pub confirmation_timeout_secs: u64,

    /// Delay before a retry whose worst-case fee exceeds the ceiling.
    pub retry_delay_ms: u64,

    /// Hard cap on claim attempts per account.
    pub max_attempts: u32,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            distributor_address: String::new(),
            token_address: String::new(),
            confirmation_timeout_secs: 120,
            retry_delay_ms: 500,
            max_attempts: 10,
        }
    }
}

/// Gas estimation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Whether to measure gas via RPC at all.
    pub estimate_gas: bool,

    /// Measure once per process and share across workers.
    pub estimate_once: bool,

    /// Gas limit used when estimation is disabled.
    pub default_gas_limit: u64,

    /// Maximum acceptable worst-case fee per transaction, in gwei.
    pub max_fee_gwei: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            estimate_gas: true,
            estimate_once: true,
            default_gas_limit: 2_000_000,
            // 0.02 native-token units
            max_fee_gwei: 20_000_000,
        }
    }
}

impl GasConfig {
    /// Resolve the two estimation flags into a mode.
    pub fn mode(&self) -> GasMode {
        match (self.estimate_gas, self.estimate_once) {
            (false, _) => GasMode::Fixed,
            (true, true) => GasMode::EstimateOnce,
            (true, false) => GasMode::EstimateAlways,
        }
    }

    /// Fee ceiling in wei.
    pub fn max_fee_wei(&self) -> u128 {
        self.max_fee_gwei as u128 * 1_000_000_000
    }
}

/// One claim account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Hex-encoded private key, with or without 0x prefix.
    pub private_key: String,

    /// Optional destination to forward claimed tokens to.
    #[serde(default)]
    pub forward_to: Option<String>,
}
