#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lk_wire::{FrameHeader, FrameType};

#[derive(Arbitrary, Debug)]
struct Input {
    type_byte: u8,
    payload_len: u32,
    timestamp_ms: u32,
}

// Fuzz target: FrameHeader write->read roundtrip.
//
// Any header whose declared size fits in a u32 must parse back to
// itself; anything larger must be refused on write.
fuzz_target!(|input: Input| {
    let header = FrameHeader::new(
        FrameType::from_wire_id(input.type_byte),
        input.payload_len,
        input.timestamp_ms,
    );

    match header.to_bytes() {
        Ok(wire) => assert_eq!(FrameHeader::read_from(&wire).unwrap(), header),
        Err(_) => assert!(input.payload_len > u32::MAX - 4),
    }
});
