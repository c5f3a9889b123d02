//! Claim execution subsystem.
//!
//! # Data Flow
//! ```text
//! HeightEvent channel (from the watcher)
//!     → orchestrator.rs (exactly-once gate, fan-out, aggregation)
//!     → worker.rs (per-account claim state machine)
//!     → gas.rs (estimation mode, inflation, fee ceiling)
//!     → outcome.rs (terminal outcomes, progress counters)
//! ```

pub mod gas;
pub mod orchestrator;
pub mod outcome;
pub mod worker;

pub use gas::{GasMode, GasPolicy, SharedGasEstimate};
pub use orchestrator::{ClaimOrchestrator, ClaimWindow};
pub use outcome::{BatchSummary, ClaimOutcome, ProgressCounters, TransferOutcome, WorkerReport};
pub use worker::ClaimWorker;
