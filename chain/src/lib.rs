//! Chain-facing pieces of the client.
//!
//! - [`BlockStatus`]: a point-in-time snapshot of the voting chain's height,
//!   last block timestamp and rolling block-time averages.
//! - [`estimator`]: pure conversions between block numbers and wall-clock time.
//! - [`ChainProvider`]: the JSON-RPC style capability used for on-chain
//!   process management. Transaction encoding lives behind this trait.

pub mod block_status;
pub mod error;
pub mod estimator;
pub mod provider;

pub use block_status::{BlockStatus, BLOCK_TIME_WINDOWS};
pub use error::ChainError;
pub use estimator::{block_at_time, time_at_block, NOMINAL_BLOCK_TIME_MS};
pub use provider::{ChainCall, ChainProvider, NewProcessParams, TxReceipt};
