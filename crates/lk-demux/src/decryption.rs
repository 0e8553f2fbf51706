use std::fmt;

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, KeyInit};
use lk_wire::frame_type::{CIPHER_BLOCK_SIZE, ENCRYPTED_PREFIX_LEN};
use tracing::debug;

use crate::config::DecryptionKey;

/// A block cipher configured for decryption.
///
/// Implementations decrypt whole 16-byte blocks in place, each block
/// independently (ECB). `buf.len()` is always a multiple of
/// [`CIPHER_BLOCK_SIZE`].
pub trait BlockDecryptor {
    fn decrypt_blocks(&self, buf: &mut [u8]);
}

/// AES-128 in ECB mode, keyed once per session.
#[derive(Clone)]
pub struct Aes128Ecb {
    cipher: Aes128,
}

impl Aes128Ecb {
    pub fn new(key: &DecryptionKey) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key.as_bytes())),
        }
    }
}

impl fmt::Debug for Aes128Ecb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Aes128Ecb(..)")
    }
}

impl BlockDecryptor for Aes128Ecb {
    fn decrypt_blocks(&self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
            self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
    }
}

/// What [`decrypt_prefix`] did to a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialDecryption {
    /// Number of 16-byte blocks decrypted.
    pub blocks: usize,
    /// Bytes considered for decryption: `min(1024, payload length)`.
    pub prefix_len: usize,
    /// Bytes inside the prefix left untouched because they do not fill
    /// a whole block.
    pub unaligned_tail: usize,
}

impl PartialDecryption {
    pub fn decrypted_len(&self) -> usize {
        self.blocks * CIPHER_BLOCK_SIZE
    }

    pub fn is_aligned(&self) -> bool {
        self.unaligned_tail == 0
    }
}

/// Decrypt the encrypted prefix of `payload` in place.
///
/// ```text
///   0                 n - n%16     n = min(1024, len)         len
///   ├── whole blocks ──┤── tail ──┤────── never touched ──────┤
///       decrypted        as sent            as sent
/// ```
///
/// A tail shorter than one block is kept exactly as received. Whether
/// those bytes were meant to be plaintext is not known; the behaviour is
/// kept as observed on the wire and logged.
pub fn decrypt_prefix<D: BlockDecryptor + ?Sized>(
    decryptor: &D,
    payload: &mut [u8],
) -> PartialDecryption {
    let prefix_len = payload.len().min(ENCRYPTED_PREFIX_LEN);
    let blocks = prefix_len / CIPHER_BLOCK_SIZE;
    let aligned = blocks * CIPHER_BLOCK_SIZE;

    if blocks > 0 {
        decryptor.decrypt_blocks(&mut payload[..aligned]);
    }

    let unaligned_tail = prefix_len - aligned;
    if unaligned_tail != 0 {
        debug!(
            prefix_len,
            unaligned_tail, "encrypted prefix is not block aligned, tail left as received"
        );
    }

    PartialDecryption {
        blocks,
        prefix_len,
        unaligned_tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncrypt;
    use std::cell::Cell;

    /// Records how many blocks it was asked to process and flips every bit.
    struct CountingDecryptor {
        blocks: Cell<usize>,
    }

    impl CountingDecryptor {
        fn new() -> Self {
            Self {
                blocks: Cell::new(0),
            }
        }
    }

    impl BlockDecryptor for CountingDecryptor {
        fn decrypt_blocks(&self, buf: &mut [u8]) {
            assert_eq!(buf.len() % CIPHER_BLOCK_SIZE, 0);
            self.blocks
                .set(self.blocks.get() + buf.len() / CIPHER_BLOCK_SIZE);
            for b in buf {
                *b = !*b;
            }
        }
    }

    #[test]
    fn empty_payload_does_nothing() {
        let d = CountingDecryptor::new();
        let result = decrypt_prefix(&d, &mut []);
        assert_eq!(result.blocks, 0);
        assert_eq!(d.blocks.get(), 0);
        assert!(result.is_aligned());
    }

    #[test]
    fn only_the_first_kilobyte_is_touched() {
        let d = CountingDecryptor::new();
        let mut payload = vec![0u8; 1030];
        let result = decrypt_prefix(&d, &mut payload);

        assert_eq!(result.blocks, 64);
        assert_eq!(d.blocks.get(), 64);
        assert!(payload[..1024].iter().all(|&b| b == 0xFF));
        assert!(payload[1024..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn unaligned_tail_is_left_alone() {
        let d = CountingDecryptor::new();
        let mut payload = vec![0u8; 20];
        let result = decrypt_prefix(&d, &mut payload);

        assert_eq!(result.blocks, 1);
        assert_eq!(result.unaligned_tail, 4);
        assert_eq!(result.decrypted_len(), 16);
        assert!(payload[..16].iter().all(|&b| b == 0xFF));
        assert!(payload[16..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn sub_block_payload_passes_through() {
        let d = CountingDecryptor::new();
        let mut payload = vec![0x11u8; 15];
        let result = decrypt_prefix(&d, &mut payload);
        assert_eq!(result.blocks, 0);
        assert_eq!(result.unaligned_tail, 15);
        assert_eq!(payload, vec![0x11u8; 15]);
    }

    #[test]
    fn aes_ecb_matches_reference_vector() {
        // FIPS-197 appendix C.1.
        let key = DecryptionKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let mut block = hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap();
        Aes128Ecb::new(&key).decrypt_blocks(&mut block);
        assert_eq!(hex::encode(block), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn blocks_are_independent() {
        let key = DecryptionKey::new([7; 16]);
        let cipher = Aes128::new(GenericArray::from_slice(key.as_bytes()));

        let mut payload = [0x42u8; 32];
        for block in payload.chunks_exact_mut(16) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        // Identical plaintext blocks give identical ciphertext under ECB.
        assert_eq!(payload[..16], payload[16..]);

        decrypt_prefix(&Aes128Ecb::new(&key), &mut payload);
        assert_eq!(payload, [0x42u8; 32]);
    }
}
