//! Block number <-> wall-clock estimation.
//!
//! The chain reports five rolling averages of its block time. For a target
//! at distance `d` from the last block, the two windows bracketing `d` are
//! interpolated linearly: a target 3.5 hours away weighs the 1h average at
//! 50% and the 6h average at 50%. Missing averages fall back to the nearest
//! measured window, and with no measurements at all to the nominal interval.
//!
//! Rounding follows mining semantics: a block only exists once its full
//! interval has elapsed, so targets in the past round to the earlier block
//! and targets in the future round down to the last block certainly mined by
//! then.

use ballotlink_types::Timestamp;

use crate::block_status::{BlockStatus, BLOCK_TIME_WINDOWS};

/// Block interval the chain is configured for.
pub const NOMINAL_BLOCK_TIME_MS: u64 = 10_000;

/// Index order in which windows are tried when the bracketing pair
/// `(lower, upper)` is incomplete: the pair itself, then finer windows, then
/// coarser ones.
fn fallback_order(lower: usize, upper: usize) -> impl Iterator<Item = usize> {
    let pair = if lower == upper {
        vec![lower]
    } else {
        vec![lower, upper]
    };
    pair.into_iter()
        .chain((0..lower).rev())
        .chain(upper + 1..BLOCK_TIME_WINDOWS.len())
}

/// Windows bracketing `distance_ms`. Both indexes are equal at the extremes.
fn bracket(distance_ms: u64) -> (usize, usize) {
    let last = BLOCK_TIME_WINDOWS.len() - 1;
    match BLOCK_TIME_WINDOWS.iter().rposition(|&w| distance_ms >= w) {
        None => (0, 0),
        Some(i) if i == last => (last, last),
        Some(i) => (i, i + 1),
    }
}

/// Effective average block time for a target `distance_ms` away.
fn average_block_time(distance_ms: u64, block_times: &[u64; 5]) -> f64 {
    let (lower, upper) = bracket(distance_ms);

    if lower != upper && block_times[lower] > 0 && block_times[upper] > 0 {
        let span = (BLOCK_TIME_WINDOWS[upper] - BLOCK_TIME_WINDOWS[lower]) as f64;
        let weight = (distance_ms - BLOCK_TIME_WINDOWS[lower]) as f64 / span;
        let lo = block_times[lower] as f64;
        let hi = block_times[upper] as f64;
        return lo + weight * (hi - lo);
    }

    fallback_order(lower, upper)
        .find(|&i| block_times[i] > 0)
        .map(|i| block_times[i] as f64)
        .unwrap_or(NOMINAL_BLOCK_TIME_MS as f64)
}

/// Estimate which block will be (or was) the last one mined at `target`.
///
/// Never returns a negative height: anything before the chain's first block
/// maps to block 0.
pub fn block_at_time(target: Timestamp, status: &BlockStatus) -> u64 {
    let target_ms = target.as_millis() as i128;
    let last_ms = status.block_timestamp.as_millis() as i128;
    let distance_ms = (target_ms - last_ms).unsigned_abs().min(u64::MAX as u128) as u64;

    let average = average_block_time(distance_ms, &status.block_times);
    let blocks = distance_ms as f64 / average;

    let current = status.block_number as i128;
    let estimated = if target_ms < last_ms {
        current - blocks.ceil() as i128
    } else {
        current + blocks.floor() as i128
    };

    estimated.clamp(0, u64::MAX as i128) as u64
}

/// Estimate the wall-clock time at which `block_number` is (or was) mined.
pub fn time_at_block(block_number: u64, status: &BlockStatus) -> Timestamp {
    let block_diff = block_number as i128 - status.block_number as i128;
    let distance_ms = block_diff
        .unsigned_abs()
        .saturating_mul(NOMINAL_BLOCK_TIME_MS as u128)
        .min(u64::MAX as u128) as u64;

    let average = average_block_time(distance_ms, &status.block_times);
    let offset_ms = (block_diff as f64 * average).round();
    let offset_ms = offset_ms.clamp(i64::MIN as f64, i64::MAX as f64) as i64;

    status.block_timestamp.offset_by(offset_ms)
}
