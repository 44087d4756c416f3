use proptest::prelude::*;

use ballotlink_chain::{block_at_time, time_at_block, BlockStatus};
use ballotlink_types::Timestamp;

const NOW: u64 = 1_700_000_000_000;

fn stable(block_number: u64, t: u64) -> BlockStatus {
    BlockStatus::new(block_number, Timestamp::from_millis(NOW), [t; 5])
}

proptest! {
    /// With equal averages in every window, block -> time -> block is exact.
    #[test]
    fn stable_times_roundtrip(
        current in 0u64..1_000_000,
        target in 0u64..2_000_000,
        t in 1_000u64..60_000,
    ) {
        let status = stable(current, t);
        // Blocks before the epoch cannot be represented as a timestamp.
        prop_assume!(target >= current || (current - target) * t <= NOW);
        let at = time_at_block(target, &status);
        prop_assert_eq!(block_at_time(at, &status), target);
    }

    /// Later targets never map to earlier blocks.
    #[test]
    fn block_at_time_is_monotonic(
        current in 0u64..1_000_000,
        t in 1_000u64..60_000,
        a in 0u64..400_000_000,
        b in 0u64..400_000_000,
    ) {
        let status = stable(current, t);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let early = Timestamp::from_millis(NOW - 200_000_000 + early);
        let late = Timestamp::from_millis(NOW - 200_000_000 + late);
        prop_assert!(block_at_time(early, &status) <= block_at_time(late, &status));
    }

    /// Anything at or before the first block's time is block 0.
    #[test]
    fn before_genesis_is_zero(
        current in 0u64..100_000,
        t in 1_000u64..60_000,
        extra in 0u64..1_000_000,
    ) {
        let status = stable(current, t);
        let genesis_minus_one = NOW - (current + 1) * t;
        let target = Timestamp::from_millis(genesis_minus_one.saturating_sub(extra));
        prop_assert_eq!(block_at_time(target, &status), 0);
    }

    /// Arbitrary (including missing) averages never panic and stay bounded.
    #[test]
    fn arbitrary_block_times_are_safe(
        times in prop::array::uniform5(0u64..100_000),
        current in 0u64..1_000_000,
        target_ms in 0u64..(2 * NOW),
    ) {
        let status = BlockStatus::new(current, Timestamp::from_millis(NOW), times);
        let target = Timestamp::from_millis(target_ms);
        let block = block_at_time(target, &status);
        if target_ms <= NOW {
            prop_assert!(block <= current);
        } else {
            prop_assert!(block >= current);
        }
    }
}
