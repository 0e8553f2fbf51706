/// Errors raised while parsing or writing the lk7777 frame layout.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The first three bytes were not the `tGt` magic sequence.
    #[error("invalid magic sequence: expected 74 47 74, got {found:02X?}")]
    InvalidMagic { found: [u8; 3] },

    /// `declared_size` is smaller than the 4-byte timestamp it must cover,
    /// so no payload length can be derived from it.
    #[error("declared frame size {declared} is smaller than the 4-byte timestamp field")]
    DeclaredSizeTooSmall { declared: u32 },

    /// A payload is too large for `declared_size` to describe.
    #[error("payload of {len} bytes cannot be described by a 32-bit declared size")]
    PayloadTooLarge { len: usize },
}
