//! Snapshot of the voting chain's progress.

use ballotlink_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Lengths of the rolling windows behind `BlockStatus::block_times`, in ms:
/// 1 minute, 10 minutes, 1 hour, 6 hours, 24 hours.
pub const BLOCK_TIME_WINDOWS: [u64; 5] = [60_000, 600_000, 3_600_000, 21_600_000, 86_400_000];

/// Height and timing of the last observed block.
///
/// Never mutated; a newer snapshot replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatus {
    pub block_number: u64,
    pub block_timestamp: Timestamp,
    /// Average block time in ms over each window of [`BLOCK_TIME_WINDOWS`].
    /// Zero means the gateway has no measurement for that window yet.
    pub block_times: [u64; 5],
}

impl BlockStatus {
    pub fn new(block_number: u64, block_timestamp: Timestamp, block_times: [u64; 5]) -> Self {
        Self {
            block_number,
            block_timestamp,
            block_times,
        }
    }
}
