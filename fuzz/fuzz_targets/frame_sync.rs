#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_wire::header::MAGIC;
use lk_wire::{FrameSync, SyncStep};

// Fuzz target: sliding-window magic search.
//
// Input format:
//   byte 0: resync budget (small, so exhaustion is reachable)
//   bytes 1..: scanned input
//
// Checks that a lock is reported exactly where the magic sequence ends
// and that the skip count never exceeds the budget.
fuzz_target!(|data: &[u8]| {
    let Some((&budget, input)) = data.split_first() else {
        return;
    };
    let budget = u32::from(budget);
    let mut sync = FrameSync::with_budget(budget);
    let mut start = 0usize;

    for (i, &byte) in input.iter().enumerate() {
        match sync.push(byte) {
            SyncStep::Pending { skipped } => assert!(skipped <= budget),
            SyncStep::Locked { skipped } => {
                assert!(skipped <= budget);
                assert_eq!(&input[i + 1 - MAGIC.len()..=i], &MAGIC);
                assert_eq!(start + skipped as usize + MAGIC.len(), i + 1);
                sync.reset();
                start = i + 1;
            }
            SyncStep::Exhausted { skipped } => {
                assert_eq!(skipped, budget);
                return;
            }
        }
    }
});
