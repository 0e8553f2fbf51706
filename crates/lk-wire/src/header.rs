use crate::error::WireError;
use crate::frame_type::FrameType;

/// Frame boundary marker: ASCII `"tGt"`.
/// Stored as raw bytes so it is compared byte by byte, never as an integer.
pub const MAGIC: [u8; 3] = [0x74, 0x47, 0x74];

/// Length of the magic sequence in bytes.
pub const MAGIC_LEN: usize = MAGIC.len();

/// Bytes following the magic sequence: type (1) + declared size (4) + timestamp (4).
pub const HEADER_TAIL_SIZE: usize = 9;

/// Total header size in bytes, magic included.
pub const HEADER_SIZE: usize = MAGIC_LEN + HEADER_TAIL_SIZE;

/// The declared size counts the timestamp field that precedes the payload.
pub const TIMESTAMP_FIELD_SIZE: u32 = 4;

/// lk7777 frame header: the fixed 12 bytes in front of every payload.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 3 bytes │ Magic: 0x74 0x47 0x74 ("tGt")            │
/// │ 0x03   │ 1 byte  │ Frame type                               │
/// │ 0x04   │ 4 bytes │ Declared size, big-endian (payload + 4)  │
/// │ 0x08   │ 4 bytes │ Timestamp in milliseconds, big-endian    │
/// │ 0x0C   │ N bytes │ Payload, N = declared size - 4           │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// There is no padding, checksum or version field. The timestamp is used
/// as both presentation and decode time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_type: FrameType,

    /// Usable payload length (`declared_size - 4`).
    pub payload_len: u32,

    pub timestamp_ms: u32,
}

impl FrameHeader {
    /// Create a header for a payload of `payload_len` bytes.
    pub fn new(frame_type: FrameType, payload_len: u32, timestamp_ms: u32) -> Self {
        Self {
            frame_type,
            payload_len,
            timestamp_ms,
        }
    }

    /// The on-wire `declared_size` field for this header.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::PayloadTooLarge`] if `payload_len + 4`
    /// overflows a `u32`.
    pub fn declared_size(&self) -> Result<u32, WireError> {
        self.payload_len
            .checked_add(TIMESTAMP_FIELD_SIZE)
            .ok_or(WireError::PayloadTooLarge {
                len: self.payload_len as usize,
            })
    }

    /// Parse the 9 bytes that follow an already located magic sequence.
    ///
    /// This is the entry point used by the demuxer: the synchronizer has
    /// consumed the magic, so only type, size and timestamp remain.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 9 bytes.
    /// - [`WireError::DeclaredSizeTooSmall`] if `declared_size < 4`.
    pub fn read_tail(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_TAIL_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let frame_type = FrameType::from_wire_id(buf[0]);
        let declared = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]);
        let timestamp_ms = u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]);

        // The declared size includes the timestamp; anything below it has
        // no payload length we could honour.
        let payload_len = declared
            .checked_sub(TIMESTAMP_FIELD_SIZE)
            .ok_or(WireError::DeclaredSizeTooSmall { declared })?;

        Ok(Self {
            frame_type,
            payload_len,
            timestamp_ms,
        })
    }

    /// Parse a complete 12-byte header, magic included.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 12 bytes.
    /// - [`WireError::InvalidMagic`] if the first 3 bytes are not [`MAGIC`].
    /// - [`WireError::DeclaredSizeTooSmall`] if `declared_size < 4`.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        if buf[..MAGIC_LEN] != MAGIC {
            return Err(WireError::InvalidMagic {
                found: [buf[0], buf[1], buf[2]],
            });
        }

        Self::read_tail(&buf[MAGIC_LEN..HEADER_SIZE])
    }

    /// Write the full 12-byte header (magic included) into `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 12 bytes.
    /// - [`WireError::PayloadTooLarge`] if the declared size overflows.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let declared = self.declared_size()?;
        buf[..MAGIC_LEN].copy_from_slice(&MAGIC);
        buf[3] = self.frame_type.wire_id();
        buf[4..8].copy_from_slice(&declared.to_be_bytes());
        buf[8..12].copy_from_slice(&self.timestamp_ms.to_be_bytes());

        Ok(())
    }

    /// Serialize the header into a fixed array.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::PayloadTooLarge`] if the declared size overflows.
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE], WireError> {
        let mut buf = [0u8; HEADER_SIZE];
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Total number of bytes this frame occupies on the wire.
    pub fn frame_len(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.payload_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_layout() {
        let buf = [
            0x74, 0x47, 0x74, // magic
            0x81, // audio, encrypted
            0x00, 0x00, 0x01, 0x04, // declared size 260
            0x00, 0x01, 0xE2, 0x40, // 123456 ms
        ];
        let header = FrameHeader::read_from(&buf).unwrap();
        assert_eq!(header.frame_type, FrameType::AudioEncrypted);
        assert_eq!(header.payload_len, 256);
        assert_eq!(header.timestamp_ms, 123_456);
        assert_eq!(header.frame_len(), 268);
    }

    #[test]
    fn write_then_read_preserves_fields() {
        let header = FrameHeader::new(FrameType::VideoEncrypted, 1030, 40);
        let bytes = header.to_bytes().unwrap();
        assert_eq!(&bytes[..3], b"tGt");
        assert_eq!(&bytes[4..8], &1034u32.to_be_bytes());
        assert_eq!(FrameHeader::read_from(&bytes).unwrap(), header);
    }

    #[test]
    fn declared_size_of_exactly_four_is_an_empty_payload() {
        let tail = [0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x07];
        let header = FrameHeader::read_tail(&tail).unwrap();
        assert_eq!(header.payload_len, 0);
        assert_eq!(header.timestamp_ms, 7);
    }

    #[test]
    fn reject_declared_size_below_timestamp() {
        for declared in 0u8..4 {
            let tail = [0x00, 0x00, 0x00, 0x00, declared, 0x00, 0x00, 0x00, 0x00];
            let result = FrameHeader::read_tail(&tail);
            assert!(
                matches!(
                    result,
                    Err(WireError::DeclaredSizeTooSmall { declared: d }) if d == u32::from(declared)
                ),
                "declared size {declared} must not underflow"
            );
        }
    }

    #[test]
    fn reject_bad_magic() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..3].copy_from_slice(b"tGx");
        let result = FrameHeader::read_from(&buf);
        assert!(matches!(
            result,
            Err(WireError::InvalidMagic {
                found: [0x74, 0x47, 0x78]
            })
        ));
    }

    #[test]
    fn reject_buffer_too_short() {
        let result = FrameHeader::read_tail(&[0x00; 5]);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 5 })));

        let result = FrameHeader::read_from(&MAGIC);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 3 })));
    }

    #[test]
    fn payload_too_large_for_declared_size() {
        let header = FrameHeader::new(FrameType::VideoPlain, u32::MAX, 0);
        assert!(matches!(
            header.declared_size(),
            Err(WireError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn unknown_type_survives_roundtrip() {
        let header = FrameHeader::new(FrameType::Unknown(0x55), 3, 9);
        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes[3], 0x55);
        assert_eq!(
            FrameHeader::read_from(&bytes).unwrap().frame_type,
            FrameType::Unknown(0x55)
        );
    }
}
