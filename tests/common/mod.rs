//! Shared test fixtures: a scriptable in-process ledger gateway.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use airdrop_claimer::ledger::{
    Account, FeeData, LedgerError, LedgerGateway, LedgerResult, TxOutcome,
};

/// Scripted behavior for one account.
#[derive(Debug, Clone)]
pub struct ScriptedAccount {
    /// Claimable amount returned for this account.
    pub claimable: U256,
    /// How many claim submissions revert before one confirms.
    pub claim_reverts: u32,
    /// Token balance after a successful claim.
    pub token_balance: U256,
    /// Whether the forwarding transfer reverts.
    pub transfer_reverts: bool,
}

impl ScriptedAccount {
    pub fn empty() -> Self {
        Self {
            claimable: U256::ZERO,
            claim_reverts: 0,
            token_balance: U256::ZERO,
            transfer_reverts: false,
        }
    }

    pub fn claimable(amount: u64) -> Self {
        Self {
            claimable: U256::from(amount),
            claim_reverts: 0,
            token_balance: U256::from(amount),
            transfer_reverts: false,
        }
    }

    pub fn with_claim_reverts(mut self, reverts: u32) -> Self {
        self.claim_reverts = reverts;
        self
    }

    pub fn with_transfer_revert(mut self) -> Self {
        self.transfer_reverts = true;
        self
    }
}

/// A recorded claim submission.
#[derive(Debug, Clone, Copy)]
pub struct Submission {
    pub account: Address,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// In-process gateway with scripted per-account behavior.
///
/// Accounts not scripted produce RPC errors, standing in for malformed
/// responses from the node.
pub struct MockGateway {
    pub window_start: u64,
    pub current_height: AtomicU64,
    pub gas_price: u128,
    pub estimate_result: u64,
    pub estimate_calls: AtomicU32,
    accounts: Mutex<HashMap<Address, ScriptedAccount>>,
    submissions: Mutex<Vec<Submission>>,
    outcomes: Mutex<HashMap<TxHash, TxOutcome>>,
    next_tx: AtomicU64,
}

impl MockGateway {
    pub fn new(window_start: u64, current_height: u64, gas_price: u128) -> Self {
        Self {
            window_start,
            current_height: AtomicU64::new(current_height),
            gas_price,
            estimate_result: 500_000,
            estimate_calls: AtomicU32::new(0),
            accounts: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            outcomes: Mutex::new(HashMap::new()),
            next_tx: AtomicU64::new(1),
        }
    }

    pub fn script(&self, address: Address, behavior: ScriptedAccount) {
        self.accounts.lock().unwrap().insert(address, behavior);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn fresh_tx_hash(&self) -> TxHash {
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst);
        TxHash::from(U256::from(n))
    }

    fn scripted(&self, address: Address) -> LedgerResult<ScriptedAccount> {
        self.accounts
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .ok_or_else(|| LedgerError::Rpc(format!("no scripted account for {}", address)))
    }
}

#[async_trait]
impl LedgerGateway for MockGateway {
    async fn block_number(&self) -> LedgerResult<u64> {
        Ok(self.current_height.load(Ordering::SeqCst))
    }

    async fn claim_window_start(&self) -> LedgerResult<u64> {
        Ok(self.window_start)
    }

    async fn claimable_amount(&self, account: Address) -> LedgerResult<U256> {
        Ok(self.scripted(account)?.claimable)
    }

    async fn token_balance(&self, account: Address) -> LedgerResult<U256> {
        Ok(self.scripted(account)?.token_balance)
    }

    async fn fee_data(&self) -> LedgerResult<FeeData> {
        Ok(FeeData {
            gas_price: self.gas_price,
        })
    }

    async fn estimate_claim_gas(&self, _account: &Account) -> LedgerResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.estimate_result)
    }

    async fn submit_claim(
        &self,
        account: &Account,
        gas_price: u128,
        gas_limit: u64,
    ) -> LedgerResult<TxHash> {
        let address = account.address();
        self.submissions.lock().unwrap().push(Submission {
            account: address,
            gas_price,
            gas_limit,
        });

        let reverts = {
            let mut accounts = self.accounts.lock().unwrap();
            let scripted = accounts
                .get_mut(&address)
                .ok_or_else(|| LedgerError::Rpc(format!("no scripted account for {}", address)))?;
            if scripted.claim_reverts > 0 {
                scripted.claim_reverts -= 1;
                true
            } else {
                false
            }
        };

        let tx_hash = self.fresh_tx_hash();
        let outcome = if reverts {
            TxOutcome::Reverted
        } else {
            TxOutcome::Confirmed { block_number: 1 }
        };
        self.outcomes.lock().unwrap().insert(tx_hash, outcome);
        Ok(tx_hash)
    }

    async fn submit_transfer(
        &self,
        account: &Account,
        _to: Address,
        _amount: U256,
    ) -> LedgerResult<TxHash> {
        let scripted = self.scripted(account.address())?;
        let tx_hash = self.fresh_tx_hash();
        let outcome = if scripted.transfer_reverts {
            TxOutcome::Reverted
        } else {
            TxOutcome::Confirmed { block_number: 1 }
        };
        self.outcomes.lock().unwrap().insert(tx_hash, outcome);
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> LedgerResult<TxOutcome> {
        self.outcomes
            .lock()
            .unwrap()
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| LedgerError::Rpc(format!("unknown transaction {}", tx_hash)))
    }
}

/// Deterministic test account: key is the index as a 32-byte big-endian hex.
pub fn test_account(index: u64) -> Account {
    Account::from_private_key(&format!("{:064x}", index), None).unwrap()
}

/// Same, with a forwarding destination.
pub fn forwarding_account(index: u64, forward_to: &str) -> Account {
    Account::from_private_key(&format!("{:064x}", index), Some(forward_to)).unwrap()
}
