//! Fixture builder for lk7777 integration tests and benches.
//!
//! [`StreamBuilder`] writes frames the way a sender would: 12-byte
//! header, then the payload with its prefix encrypted for the encrypted
//! frame types. Encryption uses AES-128 directly, independent of the
//! demuxer's own cipher code, so the tests check the demuxer against a
//! reference rather than against itself.
//!
//! ```text
//!   let bytes = StreamBuilder::new(KEY)
//!       .video(0, b"plain")
//!       .video_encrypted(40, &payload)
//!       .garbage(100)
//!       .audio_encrypted(52, &pcm)
//!       .build();
//! ```

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use lk_wire::frame_type::{CIPHER_BLOCK_SIZE, ENCRYPTED_PREFIX_LEN};
use lk_wire::{FrameHeader, FrameType};

/// Key used by most fixtures.
pub const TEST_KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

/// Encrypt the first `min(1024, len)` bytes of `payload` in place, whole
/// blocks only, the inverse of the demuxer's partial decryption.
pub fn encrypt_prefix(key: &[u8; 16], payload: &mut [u8]) {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let prefix = payload.len().min(ENCRYPTED_PREFIX_LEN);
    let aligned = prefix - prefix % CIPHER_BLOCK_SIZE;
    for block in payload[..aligned].chunks_exact_mut(CIPHER_BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// Deterministic, non-repeating payload bytes that never contain the
/// magic sequence in their plaintext.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            let b = (i as u8).wrapping_mul(31).wrapping_add(seed);
            b & 0x3F
        })
        .collect()
}

/// Builds an lk7777 byte stream frame by frame.
pub struct StreamBuilder {
    key: [u8; 16],
    out: Vec<u8>,
}

impl StreamBuilder {
    pub fn new(key: [u8; 16]) -> Self {
        Self {
            key,
            out: Vec::new(),
        }
    }

    /// Append a frame with `payload` exactly as given (no encryption).
    pub fn raw_frame(&mut self, frame_type: FrameType, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        let len = u32::try_from(payload.len()).expect("fixture payload fits in u32");
        let header = FrameHeader::new(frame_type, len, timestamp_ms)
            .to_bytes()
            .expect("fixture header is encodable");
        self.out.extend_from_slice(&header);
        self.out.extend_from_slice(payload);
        self
    }

    /// Append a frame, encrypting the payload prefix when the type calls
    /// for it.
    pub fn frame(&mut self, frame_type: FrameType, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        if frame_type.is_encrypted() {
            let mut wire = payload.to_vec();
            encrypt_prefix(&self.key, &mut wire);
            self.raw_frame(frame_type, timestamp_ms, &wire)
        } else {
            self.raw_frame(frame_type, timestamp_ms, payload)
        }
    }

    pub fn video(&mut self, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::VideoPlain, timestamp_ms, payload)
    }

    pub fn video_encrypted(&mut self, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::VideoEncrypted, timestamp_ms, payload)
    }

    pub fn audio_encrypted(&mut self, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::AudioEncrypted, timestamp_ms, payload)
    }

    pub fn auxiliary(&mut self, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::Auxiliary, timestamp_ms, payload)
    }

    pub fn unknown(&mut self, type_byte: u8, timestamp_ms: u32, payload: &[u8]) -> &mut Self {
        self.frame(FrameType::from_wire_id(type_byte), timestamp_ms, payload)
    }

    /// Append `len` bytes that can never form the magic sequence.
    pub fn garbage(&mut self, len: usize) -> &mut Self {
        self.out.extend((0..len).map(|i| if i % 2 == 0 { 0xA5 } else { 0x5A }));
        self
    }

    /// Append arbitrary bytes verbatim.
    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.out.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn build(&self) -> Vec<u8> {
        self.out.clone()
    }
}
