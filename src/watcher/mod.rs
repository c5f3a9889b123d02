//! Chain liveness watching subsystem.
//!
//! # Data Flow
//! ```text
//! WSS endpoint
//!     → subscription.rs (eth_subscribe framing, newHeads decoding)
//!     → liveness.rs (ping/pong probe, reconnect loop)
//!     → mpsc channel of HeightEvent
//!     → claim orchestrator
//! ```

pub mod liveness;
pub mod subscription;

pub use liveness::{HeightEvent, LivenessWatcher, WatcherError};
