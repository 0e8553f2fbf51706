#![no_main]

use libfuzzer_sys::fuzz_target;
use lk_demux::{DemuxError, Demuxer, Lk7777Demuxer};

// Fuzz target: full demuxer over arbitrary bytes.
//
// Catches bugs in:
// - Resync accounting
// - Truncated headers and payloads
// - Partial decryption bounds
// - Consumption beyond the input
fuzz_target!(|data: &[u8]| {
    let Ok(mut demuxer) = Lk7777Demuxer::open_with_key(data, &[0u8; 16]) else {
        return;
    };

    loop {
        match demuxer.read_frame() {
            Ok(Some(_)) => assert!(demuxer.position() <= data.len() as u64),
            Ok(None) => break,
            Err(e) => {
                assert!(matches!(demuxer.read_frame(), Err(DemuxError::Unusable)), "{e}");
                break;
            }
        }
    }
});
