#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: FrameHeader::read_from header parsing.
//
// Catches bugs in:
// - Short buffers
// - Declared sizes below the timestamp field
// - Magic comparison
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = lk_wire::FrameHeader::read_from(data) {
        assert!(header.frame_len() >= 12);
    }
});
