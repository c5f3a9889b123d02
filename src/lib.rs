//! Airdrop Claimer
//!
//! A one-shot batch tool that watches the chain for a block-height-gated
//! token-claim window to open, then concurrently claims (and optionally
//! forwards) tokens for a fixed set of accounts, with gas-inflation retry
//! bounded by a fee ceiling.
//!
//! # Architecture Overview
//!
//! ```text
//!   WSS endpoint                     HTTP RPC endpoint
//!        │                                  ▲
//!        ▼                                  │
//!  ┌───────────┐  HeightEvent  ┌──────────────┐   spawn   ┌────────────┐
//!  │  watcher  │──────────────▶│ orchestrator │──────────▶│  workers   │
//!  │ ping/pong │               │ gate + fanout│  1/account│ claim/retry│
//!  │ reconnect │               │  + counters  │◀──────────│  /forward  │
//!  └───────────┘               └──────┬───────┘  reports  └────────────┘
//!                                     │
//!                                     ▼
//!                              final summary, exit
//! ```

// Core subsystems
pub mod claim;
pub mod config;
pub mod ledger;
pub mod watcher;

// Cross-cutting concerns
pub mod resilience;

pub use claim::{BatchSummary, ClaimOrchestrator, GasPolicy};
pub use config::ClaimerConfig;
pub use ledger::{Account, LedgerGateway, RpcGateway};
pub use watcher::{HeightEvent, LivenessWatcher};
