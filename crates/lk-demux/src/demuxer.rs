use std::io::Read;

use lk_types::{Packet, StreamInfo, TypeError};
use lk_wire::FrameRoute;
use tracing::debug;

use crate::config::DemuxConfig;
use crate::decryption::{Aes128Ecb, BlockDecryptor};
use crate::dispatch::Dispatcher;
use crate::error::DemuxError;
use crate::event::{DemuxEvent, DemuxStats};
use crate::frame_reader::{FrameInfo, FrameReader};
use crate::registry::StreamRegistry;

/// Static facts about an input format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub long_name: &'static str,
    pub flags: FormatFlags,
    /// Whether [`Demuxer::seek`] can ever succeed.
    pub seekable: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// The format must be detected by probing content, never by a
    /// generic index or extension search.
    pub no_generic_search: bool,
    /// Timestamps may jump backwards or skip; consumers must not assume
    /// they are monotonic.
    pub ts_discontinuous: bool,
}

pub const LK7777_FORMAT: FormatDescriptor = FormatDescriptor {
    name: "lk7777",
    long_name: "LK 7777 Streaming",
    flags: FormatFlags {
        no_generic_search: true,
        ts_discontinuous: true,
    },
    seekable: false,
};

/// The operations a container demuxer exposes to a media pipeline.
///
/// ```text
///   probe ─► open ─► read_frame / read_packet (repeated) ─► close
/// ```
///
/// Reads are pull-based and blocking. A demuxer is driven by one caller
/// at a time; `close` consumes it, so no read can follow.
pub trait Demuxer: Sized {
    /// The byte source the demuxer reads from.
    type Source;

    fn descriptor() -> &'static FormatDescriptor;

    /// Confidence, from 0 to [`lk_wire::probe::PROBE_SCORE_MAX`], that
    /// `buf` is the start of this format.
    fn probe(buf: &[u8]) -> u32;

    /// Open a session over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::Config`] if the configuration is rejected.
    fn open(source: Self::Source, config: &DemuxConfig) -> Result<Self, DemuxError>;

    fn streams(&self) -> &[StreamInfo];

    /// Read the next frame, whether or not it yields a packet.
    /// `Ok(None)` marks the end of the stream.
    ///
    /// # Errors
    ///
    /// Any fatal error ends the session.
    fn read_frame(&mut self) -> Result<Option<DemuxEvent>, DemuxError>;

    /// Read frames until the next packet, skipping discarded frames.
    ///
    /// # Errors
    ///
    /// See [`read_frame`](Self::read_frame).
    fn read_packet(&mut self) -> Result<Option<Packet>, DemuxError> {
        loop {
            match self.read_frame()? {
                Some(DemuxEvent::Packet(packet)) => return Ok(Some(packet)),
                Some(DemuxEvent::Discarded(_)) => {}
                None => return Ok(None),
            }
        }
    }

    /// Reposition the demuxer near `timestamp` on `stream_index`.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::SeekUnsupported`] unless the format declares
    /// itself seekable. The read position is unchanged in that case.
    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<(), DemuxError> {
        let _ = (stream_index, timestamp);
        Err(DemuxError::SeekUnsupported)
    }

    /// End the session and release its resources.
    fn close(self) -> DemuxStats;
}

/// Where a session stands.
///
/// ```text
///   Opened ──read──► Reading ──end of input──► Finished
///      │                │
///      └──fatal error───┴─────────────────────► Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Streams are set up; nothing has been read.
    Opened,
    Reading,
    /// End of input reached; further reads return `Ok(None)`.
    Finished,
    /// A fatal error occurred; further reads fail with
    /// [`DemuxError::Unusable`].
    Failed,
}

/// Blocking lk7777 demuxer over any [`Read`] source.
///
/// Each call to [`read_frame`](Demuxer::read_frame) locates one frame,
/// reads or skips its payload, and decrypts the payload prefix for the
/// encrypted types. Every frame consumes exactly `12 + payload_len`
/// bytes, plus whatever garbage resync skipped in front of it.
///
/// # Example
///
/// ```rust
/// use lk_demux::{Demuxer, DemuxConfig, DecryptionKey, Lk7777Demuxer};
///
/// let key = DecryptionKey::new([0u8; 16]);
/// let input: &[u8] = &[];
/// let mut demuxer = Lk7777Demuxer::open(input, &DemuxConfig::new(key)).unwrap();
/// assert_eq!(demuxer.streams().len(), 2);
/// assert!(demuxer.read_packet().unwrap().is_none());
/// ```
pub struct Lk7777Demuxer<R> {
    reader: FrameReader<R>,
    dispatcher: Dispatcher,
    registry: StreamRegistry,
    state: SessionState,
    last_frame: Option<FrameInfo>,
}

impl<R: Read> Lk7777Demuxer<R> {
    /// Open a session after validating raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::Config`] unless `key` is exactly 16 bytes.
    pub fn open_with_key(source: R, key: &[u8]) -> Result<Self, DemuxError> {
        let config = DemuxConfig::from_key_bytes(key)?;
        <Self as Demuxer>::open(source, &config)
    }

    /// Open a session that decrypts with a caller-supplied block cipher.
    pub fn open_with_decryptor(source: R, decryptor: Box<dyn BlockDecryptor + Send>) -> Self {
        let registry = StreamRegistry::lk7777();
        debug!(streams = registry.streams().len(), "lk7777 session opened");
        Self {
            reader: FrameReader::new(source),
            dispatcher: Dispatcher::new(decryptor),
            registry,
            state: SessionState::Opened,
            last_frame: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &DemuxStats {
        self.dispatcher.stats()
    }

    /// Header and location of the most recently read frame.
    pub fn last_frame(&self) -> Option<&FrameInfo> {
        self.last_frame.as_ref()
    }

    /// Absolute offset of the next unread input byte.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Look up a stream descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownStream`] for an index outside the table.
    pub fn stream(&self, index: usize) -> Result<&StreamInfo, TypeError> {
        self.registry.get(index)
    }

    fn next_event(&mut self) -> Result<Option<DemuxEvent>, DemuxError> {
        let Some(info) = self.reader.next_header()? else {
            return Ok(None);
        };
        self.last_frame = Some(info);

        let event = match self.dispatcher.route(&info) {
            FrameRoute::Keep {
                stream_index,
                encrypted,
            } => {
                let payload = self.reader.read_payload(&info.header)?;
                self.dispatcher.packet(&info, stream_index, encrypted, payload)
            }
            FrameRoute::Discard => {
                self.reader.skip_payload(&info.header)?;
                self.dispatcher.discarded(&info)
            }
        };
        Ok(Some(event))
    }
}

impl<R: Read> Demuxer for Lk7777Demuxer<R> {
    type Source = R;

    fn descriptor() -> &'static FormatDescriptor {
        &LK7777_FORMAT
    }

    fn probe(buf: &[u8]) -> u32 {
        lk_wire::probe::probe(buf)
    }

    fn open(source: R, config: &DemuxConfig) -> Result<Self, DemuxError> {
        Ok(Self::open_with_decryptor(
            source,
            Box::new(Aes128Ecb::new(&config.key)),
        ))
    }

    fn streams(&self) -> &[StreamInfo] {
        self.registry.streams()
    }

    fn read_frame(&mut self) -> Result<Option<DemuxEvent>, DemuxError> {
        match self.state {
            SessionState::Failed => return Err(DemuxError::Unusable),
            SessionState::Finished => return Ok(None),
            SessionState::Opened | SessionState::Reading => {}
        }

        match self.next_event() {
            Ok(Some(event)) => {
                self.state = SessionState::Reading;
                Ok(Some(event))
            }
            Ok(None) => {
                debug!(offset = self.reader.position(), "end of lk7777 stream");
                self.state = SessionState::Finished;
                Ok(None)
            }
            Err(e) => {
                if e.is_fatal() {
                    self.state = SessionState::Failed;
                }
                Err(e)
            }
        }
    }

    fn close(self) -> DemuxStats {
        let stats = *self.dispatcher.stats();
        debug!(
            frames = stats.frames,
            packets = stats.packets(),
            resync_bytes = stats.resync_bytes,
            "lk7777 session closed"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecryptionKey;
    use lk_wire::{FrameHeader, FrameType};
    use std::io::Cursor;

    fn frame(frame_type: FrameType, payload: &[u8], ts: u32) -> Vec<u8> {
        let len = u32::try_from(payload.len()).unwrap();
        let mut out = FrameHeader::new(frame_type, len, ts).to_bytes().unwrap().to_vec();
        out.extend_from_slice(payload);
        out
    }

    fn open(input: Vec<u8>) -> Lk7777Demuxer<Cursor<Vec<u8>>> {
        let config = DemuxConfig::new(DecryptionKey::new([0u8; 16]));
        Lk7777Demuxer::open(Cursor::new(input), &config).unwrap()
    }

    #[test]
    fn descriptor_declares_no_seeking() {
        let d = <Lk7777Demuxer<&[u8]> as Demuxer>::descriptor();
        assert_eq!(d.name, "lk7777");
        assert_eq!(d.long_name, "LK 7777 Streaming");
        assert!(d.flags.no_generic_search);
        assert!(d.flags.ts_discontinuous);
        assert!(!d.seekable);
    }

    #[test]
    fn probe_delegates_to_magic_check() {
        assert_eq!(Lk7777Demuxer::<&[u8]>::probe(b"tGt"), 32);
        assert_eq!(Lk7777Demuxer::<&[u8]>::probe(&[0, 0, 0]), 0);
    }

    #[test]
    fn wrong_key_length_fails_before_open() {
        let err = Lk7777Demuxer::open_with_key(Cursor::new(Vec::new()), &[0u8; 15])
            .err()
            .unwrap();
        assert!(matches!(err, DemuxError::Config(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn read_packet_skips_discarded_frames() {
        let mut input = frame(FrameType::Auxiliary, &[9; 5], 1);
        input.extend(frame(FrameType::Unknown(0x55), &[7; 3], 2));
        input.extend(frame(FrameType::VideoPlain, b"nal", 3));
        let mut demuxer = open(input);

        let packet = demuxer.read_packet().unwrap().unwrap();
        assert_eq!(packet.data.as_ref(), b"nal");
        assert_eq!(packet.pts, 3);
        assert_eq!(packet.pos, 32);
        assert_eq!(demuxer.stats().discarded_frames, 2);
        assert_eq!(demuxer.stats().unknown_frames, 1);
        assert!(demuxer.read_packet().unwrap().is_none());
        assert_eq!(demuxer.state(), SessionState::Finished);
    }

    #[test]
    fn state_transitions() {
        let mut demuxer = open(frame(FrameType::VideoPlain, b"a", 0));
        assert_eq!(demuxer.state(), SessionState::Opened);
        demuxer.read_frame().unwrap();
        assert_eq!(demuxer.state(), SessionState::Reading);
        assert!(demuxer.read_frame().unwrap().is_none());
        assert!(demuxer.read_frame().unwrap().is_none());
        assert_eq!(demuxer.state(), SessionState::Finished);
    }

    #[test]
    fn fatal_error_makes_session_unusable() {
        let mut input = frame(FrameType::VideoPlain, b"abcdef", 0);
        input.truncate(14);
        let mut demuxer = open(input);

        assert!(demuxer.read_frame().unwrap_err().is_truncated());
        assert_eq!(demuxer.state(), SessionState::Failed);
        assert!(matches!(demuxer.read_frame(), Err(DemuxError::Unusable)));
    }

    #[test]
    fn seek_is_refused_without_moving() {
        let mut input = frame(FrameType::VideoPlain, b"a", 0);
        input.extend(frame(FrameType::VideoPlain, b"b", 40));
        let mut demuxer = open(input);

        demuxer.read_packet().unwrap();
        let before = demuxer.position();
        assert!(matches!(demuxer.seek(0, 0), Err(DemuxError::SeekUnsupported)));
        assert_eq!(demuxer.position(), before);
        assert_eq!(demuxer.state(), SessionState::Reading);
        assert_eq!(demuxer.read_packet().unwrap().unwrap().pts, 40);
    }

    #[test]
    fn close_returns_final_counters() {
        let mut demuxer = open(frame(FrameType::VideoPlain, b"abc", 0));
        demuxer.read_packet().unwrap();
        let stats = demuxer.close();
        assert_eq!(stats.video_packets, 1);
        assert_eq!(stats.payload_bytes, 3);
    }
}
