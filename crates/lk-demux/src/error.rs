use lk_wire::WireError;

use crate::config::ConfigError;

/// Errors that can occur while opening or reading an lk7777 stream.
///
/// End-of-stream is not an error: read calls return `Ok(None)` when the
/// byte source is exhausted at a frame boundary.
///
/// Error hierarchy:
///
/// ```text
///   DemuxError
///   ├── Config(ConfigError)     ← key missing, wrong length, bad hex (open)
///   ├── ResourceExhausted       ← payload buffer could not be allocated
///   ├── StreamCorruption        ← resync budget spent without a magic match
///   ├── Truncated               ← source ended inside a header or payload
///   ├── InvalidFrame            ← header fields violate the frame layout
///   ├── SeekUnsupported         ← seek requested on a sequential-only format
///   ├── Unusable                ← read after a fatal error
///   └── Io(std::io::Error)      ← any other failure of the byte source
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// The session configuration was rejected before any stream was created.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A payload buffer of the declared size could not be reserved.
    #[error("cannot allocate {requested} bytes for a frame payload")]
    ResourceExhausted { requested: usize },

    /// The synchronizer discarded its whole budget without finding a
    /// frame boundary. The stream is malformed from here on.
    #[error("malformed stream: no frame boundary within {skipped} bytes (offset {offset})")]
    StreamCorruption { skipped: u32, offset: u64 },

    /// The byte source ended before a requested read or skip completed.
    #[error("truncated input at offset {offset}: needed {needed} bytes, got {available}")]
    Truncated {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// A located frame carries a header that cannot be honoured.
    #[error("invalid frame at offset {offset}: {source}")]
    InvalidFrame {
        offset: u64,
        #[source]
        source: WireError,
    },

    /// The format is sequential; repositioning is never performed.
    #[error("seeking is not supported by the lk7777 format")]
    SeekUnsupported,

    /// A previous read failed fatally and the session cannot continue.
    #[error("session is unusable after a previous fatal error")]
    Unusable,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DemuxError {
    /// The input itself is bad (as opposed to the configuration or the
    /// underlying I/O channel).
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            Self::StreamCorruption { .. } | Self::InvalidFrame { .. }
        )
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Whether the session must stop reading after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::SeekUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let corrupt = DemuxError::StreamCorruption {
            skipped: 200_000,
            offset: 200_003,
        };
        assert!(corrupt.is_invalid_data());
        assert!(corrupt.is_fatal());

        let short = DemuxError::Truncated {
            offset: 12,
            needed: 100,
            available: 5,
        };
        assert!(short.is_truncated());
        assert!(!short.is_invalid_data());
        assert!(short.is_fatal());

        assert!(!DemuxError::SeekUnsupported.is_fatal());
        assert!(!DemuxError::Config(ConfigError::MissingKey).is_fatal());
    }

    #[test]
    fn messages_carry_context() {
        let e = DemuxError::Truncated {
            offset: 12,
            needed: 100,
            available: 5,
        };
        assert_eq!(
            e.to_string(),
            "truncated input at offset 12: needed 100 bytes, got 5"
        );
    }
}
