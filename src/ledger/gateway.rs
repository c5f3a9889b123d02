//! Ledger gateway: RPC capability surface over the remote chain.
//!
//! # Responsibilities
//! - Read chain state (block height, claim window, claimable amounts, balances)
//! - Estimate gas and read fee data
//! - Submit claim and transfer transactions, wait for confirmation
//! - Handle timeouts and network errors gracefully
//!
//! The orchestrator and workers only ever see the [`LedgerGateway`] trait;
//! the alloy-backed [`RpcGateway`] is the production implementation.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::config::schema::{ClaimConfig, NetworkConfig};
use crate::ledger::account::Account;
use crate::ledger::types::{FeeData, LedgerError, LedgerResult, TxOutcome};

sol! {
    #[sol(rpc)]
    interface ITokenDistributor {
        function claimableTokens(address account) external view returns (uint256);
        function claimPeriodStart() external view returns (uint256);
        function claim() external;
    }

    #[sol(rpc)]
    interface IErc20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Capability surface over the remote ledger.
///
/// Every call is a network round-trip that may fail or time out.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Latest block height.
    async fn block_number(&self) -> LedgerResult<u64>;

    /// Block height at which the claim window opens.
    async fn claim_window_start(&self) -> LedgerResult<u64>;

    /// Amount of tokens the account can currently claim.
    async fn claimable_amount(&self, account: Address) -> LedgerResult<U256>;

    /// Token balance of the account.
    async fn token_balance(&self, account: Address) -> LedgerResult<U256>;

    /// Current fee conditions.
    async fn fee_data(&self) -> LedgerResult<FeeData>;

    /// Measured gas cost of the claim call for this account.
    async fn estimate_claim_gas(&self, account: &Account) -> LedgerResult<u64>;

    /// Submit the claim transaction with explicit gas parameters.
    async fn submit_claim(
        &self,
        account: &Account,
        gas_price: u128,
        gas_limit: u64,
    ) -> LedgerResult<TxHash>;

    /// Submit a token transfer of `amount` to `to`.
    async fn submit_transfer(
        &self,
        account: &Account,
        to: Address,
        amount: U256,
    ) -> LedgerResult<TxHash>;

    /// Wait until the transaction is mined and report its outcome.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> LedgerResult<TxOutcome>;
}

/// Alloy-backed gateway over an HTTP JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcGateway {
    /// Read-only provider, shared across all calls.
    provider: DynProvider,
    /// Endpoint URL, reused to build per-account signing providers.
    rpc_url: url::Url,
    /// Distributor contract address.
    distributor: Address,
    /// Token contract address.
    token: Address,
    /// Per-call RPC timeout.
    rpc_timeout: Duration,
    /// Upper bound on waiting for a transaction to be mined.
    confirmation_timeout: Duration,
}

impl RpcGateway {
    /// Create a gateway from validated configuration.
    pub fn new(network: &NetworkConfig, claim: &ClaimConfig) -> LedgerResult<Self> {
        let rpc_url: url::Url = network.rpc_http_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", network.rpc_http_url, e))
        })?;

        let distributor: Address = claim.distributor_address.parse().map_err(|e| {
            LedgerError::Rpc(format!(
                "Invalid distributor address '{}': {}",
                claim.distributor_address, e
            ))
        })?;

        let token: Address = claim.token_address.parse().map_err(|e| {
            LedgerError::Rpc(format!(
                "Invalid token address '{}': {}",
                claim.token_address, e
            ))
        })?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();

        tracing::info!(
            rpc_url = %network.rpc_http_url,
            distributor = %distributor,
            token = %token,
            "Ledger gateway initialized"
        );

        Ok(Self {
            provider,
            rpc_url,
            distributor,
            token,
            rpc_timeout: Duration::from_secs(network.rpc_timeout_secs),
            confirmation_timeout: Duration::from_secs(claim.confirmation_timeout_secs),
        })
    }

    /// Build a signing provider for an account.
    fn signing_provider(&self, account: &Account) -> DynProvider {
        let wallet = EthereumWallet::from(account.signer().clone());
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone())
            .erased()
    }

    /// Run an RPC call under the configured timeout.
    async fn with_timeout<T, E, F>(&self, fut: F) -> LedgerResult<T>
    where
        E: std::fmt::Display,
        F: std::future::IntoFuture<Output = Result<T, E>>,
        F::IntoFuture: Send,
    {
        match timeout(self.rpc_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.rpc_timeout.as_secs())),
        }
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn block_number(&self) -> LedgerResult<u64> {
        self.with_timeout(self.provider.get_block_number()).await
    }

    async fn claim_window_start(&self) -> LedgerResult<u64> {
        let contract = ITokenDistributor::new(self.distributor, self.provider.clone());
        let start = self.with_timeout(contract.claimPeriodStart().call()).await?;
        u64::try_from(start)
            .map_err(|_| LedgerError::Malformed(format!("claim period start {} overflows u64", start)))
    }

    async fn claimable_amount(&self, account: Address) -> LedgerResult<U256> {
        let contract = ITokenDistributor::new(self.distributor, self.provider.clone());
        self.with_timeout(contract.claimableTokens(account).call())
            .await
    }

    async fn token_balance(&self, account: Address) -> LedgerResult<U256> {
        let contract = IErc20::new(self.token, self.provider.clone());
        self.with_timeout(contract.balanceOf(account).call()).await
    }

    async fn fee_data(&self) -> LedgerResult<FeeData> {
        let gas_price = self.with_timeout(self.provider.get_gas_price()).await?;
        Ok(FeeData { gas_price })
    }

    async fn estimate_claim_gas(&self, account: &Account) -> LedgerResult<u64> {
        let contract = ITokenDistributor::new(self.distributor, self.provider.clone());
        self.with_timeout(contract.claim().from(account.address()).estimate_gas())
            .await
    }

    async fn submit_claim(
        &self,
        account: &Account,
        gas_price: u128,
        gas_limit: u64,
    ) -> LedgerResult<TxHash> {
        let provider = self.signing_provider(account);
        let contract = ITokenDistributor::new(self.distributor, provider);
        let pending = self
            .with_timeout(
                contract
                    .claim()
                    .from(account.address())
                    .gas_price(gas_price)
                    .gas(gas_limit)
                    .send(),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn submit_transfer(
        &self,
        account: &Account,
        to: Address,
        amount: U256,
    ) -> LedgerResult<TxHash> {
        let provider = self.signing_provider(account);
        let contract = IErc20::new(self.token, provider);
        let pending = self
            .with_timeout(contract.transfer(to, amount).from(account.address()).send())
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> LedgerResult<TxOutcome> {
        let poll_interval = Duration::from_secs(2);

        let result = timeout(self.confirmation_timeout, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) => return Err(LedgerError::Rpc(e.to_string())),
                };

                if !receipt.status() {
                    return Ok(TxOutcome::Reverted);
                }

                return Ok(TxOutcome::Confirmed {
                    block_number: receipt.block_number.unwrap_or_default(),
                });
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(LedgerError::ConfirmationTimeout(
                self.confirmation_timeout.as_secs(),
            )),
        }
    }
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("distributor", &self.distributor)
            .field("token", &self.token)
            .finish()
    }
}
