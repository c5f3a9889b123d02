//! Claim account loading and identity.
//!
//! # Security
//! - Private keys come from the config file only
//! - Keys are never logged; only a short prefix of the key hex is
//!   ever surfaced as the account identifier

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::ledger::types::{LedgerError, LedgerResult};

/// Length of the key-hex prefix used as the public account identifier.
const ID_PREFIX_LEN: usize = 8;

/// A claim account: signer plus an optional forwarding destination.
///
/// Immutable once loaded; lives for the whole process.
#[derive(Debug, Clone)]
pub struct Account {
    /// Short identifier for logs. Derived from the key, never the full key.
    id: String,
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Where to forward claimed tokens, if set.
    forward_to: Option<Address>,
}

impl Account {
    /// Create an account from a hex-encoded private key string.
    ///
    /// The key may carry a `0x` prefix. `forward_to`, when present, must be
    /// a valid checksummed or lowercase hex address.
    pub fn from_private_key(
        private_key_hex: &str,
        forward_to: Option<&str>,
    ) -> LedgerResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;

        let id = key_hex.chars().take(ID_PREFIX_LEN).collect();

        let forward_to = match forward_to {
            Some(addr) => Some(addr.parse().map_err(|e| {
                LedgerError::Wallet(format!("Invalid forwarding address '{}': {}", addr, e))
            })?),
            None => None,
        };

        Ok(Self {
            id,
            signer,
            forward_to,
        })
    }

    /// Short identifier safe to log.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The account's on-chain address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer, for transaction submission.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Forwarding destination for claimed tokens, if configured.
    pub fn forward_to(&self) -> Option<Address> {
        self.forward_to
    }
}
