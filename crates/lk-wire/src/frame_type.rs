/// Upper bound on the ciphertext prefix of an encrypted payload.
/// Bytes past this offset are always sent in the clear.
pub const ENCRYPTED_PREFIX_LEN: usize = 1024;

/// AES block size. Only whole blocks inside the prefix are ciphertext.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Logical stream indices assigned by frame routing.
///
/// The stream topology is fixed: one video stream, one audio stream,
/// created in this order when a session is opened.
pub mod stream_index {
    pub const VIDEO: usize = 0;
    pub const AUDIO: usize = 1;
}

/// Frame type byte found at offset 3 of every header.
///
/// ```text
/// ┌──────┬────────────────┬────────┬──────────────────────────────┐
/// │ Wire │ Variant        │ Stream │ Handling                     │
/// ├──────┼────────────────┼────────┼──────────────────────────────┤
/// │ 0x00 │ VideoPlain     │ 0      │ payload passed through       │
/// │ 0x80 │ VideoEncrypted │ 0      │ prefix decrypted, then kept  │
/// │ 0x81 │ AudioEncrypted │ 1      │ prefix decrypted, then kept  │
/// │ 0x82 │ Auxiliary      │ -      │ payload skipped              │
/// │ else │ Unknown(u8)    │ -      │ logged, payload skipped      │
/// └──────┴────────────────┴────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    VideoPlain,
    VideoEncrypted,
    AudioEncrypted,
    /// Observed on the wire but never decoded; contents are unknown.
    Auxiliary,
    /// Any other type byte. The raw value is kept for diagnostics.
    Unknown(u8),
}

/// What the demuxer does with a frame's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRoute {
    /// Read the payload into a packet for `stream_index`, decrypting
    /// its prefix first when `encrypted` is set.
    Keep { stream_index: usize, encrypted: bool },
    /// Skip the payload on the cursor without allocating a packet.
    Discard,
}

impl FrameType {
    /// Return the wire byte for this frame type.
    pub fn wire_id(self) -> u8 {
        match self {
            Self::VideoPlain => 0x00,
            Self::VideoEncrypted => 0x80,
            Self::AudioEncrypted => 0x81,
            Self::Auxiliary => 0x82,
            Self::Unknown(id) => id,
        }
    }

    /// Parse a wire byte. Never fails: unrecognised values become `Unknown`.
    pub fn from_wire_id(id: u8) -> Self {
        match id {
            0x00 => Self::VideoPlain,
            0x80 => Self::VideoEncrypted,
            0x81 => Self::AudioEncrypted,
            0x82 => Self::Auxiliary,
            other => Self::Unknown(other),
        }
    }

    /// Dispatch table lookup for this frame type.
    pub fn route(self) -> FrameRoute {
        match self {
            Self::VideoPlain => FrameRoute::Keep {
                stream_index: stream_index::VIDEO,
                encrypted: false,
            },
            Self::VideoEncrypted => FrameRoute::Keep {
                stream_index: stream_index::VIDEO,
                encrypted: true,
            },
            Self::AudioEncrypted => FrameRoute::Keep {
                stream_index: stream_index::AUDIO,
                encrypted: true,
            },
            Self::Auxiliary | Self::Unknown(_) => FrameRoute::Discard,
        }
    }

    pub fn is_encrypted(self) -> bool {
        matches!(self.route(), FrameRoute::Keep { encrypted: true, .. })
    }

    /// Short label used in logs and listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::VideoPlain => "video",
            Self::VideoEncrypted => "video/enc",
            Self::AudioEncrypted => "audio/enc",
            Self::Auxiliary => "aux",
            Self::Unknown(_) => "unknown",
        }
    }
}
