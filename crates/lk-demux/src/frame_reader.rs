use std::fmt;
use std::io::Read;

use lk_wire::header::{HEADER_TAIL_SIZE, MAGIC_LEN};
use lk_wire::{FrameHeader, FrameSync, SyncStep};
use tracing::{debug, error, trace, warn};

use crate::cursor::ByteCursor;
use crate::error::DemuxError;

/// A located frame header together with where it was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// Absolute offset of the frame's magic sequence.
    pub offset: u64,
    /// Garbage bytes discarded by resync immediately before this frame.
    pub resync_skipped: u32,
    pub header: FrameHeader,
}

/// One listing line: `@offset label type=0x.. len=.. ts=..`, with a
/// `resync=N` suffix when garbage preceded the frame.
impl fmt::Display for FrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(
            f,
            "@{:<8} {:<9} type=0x{:02x} len={:<6} ts={}",
            self.offset,
            h.frame_type.label(),
            h.frame_type.wire_id(),
            h.payload_len,
            h.timestamp_ms
        )?;
        if self.resync_skipped > 0 {
            write!(f, " resync={}", self.resync_skipped)?;
        }
        Ok(())
    }
}

/// Outcome of one sync-window step, shared by the blocking and the
/// async readers so both log and fail identically.
pub(crate) enum ScanOutcome {
    Continue,
    Locked { skipped: u32 },
}

/// Feed one byte to `sync` and translate the step into logging and
/// errors. `position` is the cursor offset after the byte was consumed.
pub(crate) fn scan_byte(
    sync: &mut FrameSync,
    byte: u8,
    position: u64,
) -> Result<ScanOutcome, DemuxError> {
    let step = sync.push(byte);
    if step.entered_resync() {
        warn!(offset = position - 1 - MAGIC_LEN as u64, "lost frame sync, resyncing");
    }
    match step {
        SyncStep::Pending { .. } => Ok(ScanOutcome::Continue),
        SyncStep::Locked { skipped } => {
            if skipped > 0 {
                warn!(skipped, offset = position - MAGIC_LEN as u64, "frame sync recovered");
            }
            sync.reset();
            Ok(ScanOutcome::Locked { skipped })
        }
        SyncStep::Exhausted { skipped } => {
            error!(skipped, offset = position, "malformed stream, cannot locate frame boundary");
            Err(DemuxError::StreamCorruption {
                skipped,
                offset: position,
            })
        }
    }
}

/// Called when input ends during a magic search.
pub(crate) fn end_of_scan(sync: &FrameSync) {
    if sync.is_started() {
        debug!(trailing = sync.consumed(), "input ended before another frame boundary");
    }
}

/// Parse the header tail read after the magic sequence at `offset`.
pub(crate) fn parse_tail(
    tail: &[u8; HEADER_TAIL_SIZE],
    offset: u64,
    resync_skipped: u32,
) -> Result<FrameInfo, DemuxError> {
    let header =
        FrameHeader::read_tail(tail).map_err(|source| DemuxError::InvalidFrame { offset, source })?;
    trace!(
        offset,
        frame_type = header.frame_type.label(),
        payload_len = header.payload_len,
        timestamp_ms = header.timestamp_ms,
        "frame"
    );
    Ok(FrameInfo {
        offset,
        resync_skipped,
        header,
    })
}

/// Locates frames in a byte source and reads or skips their payloads.
///
/// This is the layer below the demuxer: it knows the framing but not
/// the routing, so it can also list the frames of a stream for which no
/// key is available.
///
/// ```text
///   next_header ─► read_payload | skip_payload ─► next_header ─► ...
/// ```
///
/// Every header must be followed by exactly one payload read or skip
/// before the next call to [`next_header`](Self::next_header).
#[derive(Debug)]
pub struct FrameReader<R> {
    cursor: ByteCursor<R>,
    sync: FrameSync,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            cursor: ByteCursor::new(inner),
            sync: FrameSync::new(),
        }
    }

    /// Scan for the next magic sequence and parse the header behind it.
    ///
    /// Returns `Ok(None)` when the input ends before a magic sequence is
    /// found, including while skipping trailing garbage.
    ///
    /// # Errors
    ///
    /// - [`DemuxError::StreamCorruption`] if the resync budget runs out.
    /// - [`DemuxError::Truncated`] if the input ends inside the header.
    /// - [`DemuxError::InvalidFrame`] if the declared size is below 4.
    pub fn next_header(&mut self) -> Result<Option<FrameInfo>, DemuxError> {
        let skipped = loop {
            let Some(byte) = self.cursor.try_read_u8()? else {
                end_of_scan(&self.sync);
                self.sync.reset();
                return Ok(None);
            };
            if let ScanOutcome::Locked { skipped } =
                scan_byte(&mut self.sync, byte, self.cursor.position())?
            {
                break skipped;
            }
        };

        let offset = self.cursor.position() - MAGIC_LEN as u64;
        let tail = self.cursor.read_array::<HEADER_TAIL_SIZE>()?;
        parse_tail(&tail, offset, skipped).map(Some)
    }

    /// Read the payload announced by the last header.
    ///
    /// # Errors
    ///
    /// - [`DemuxError::ResourceExhausted`] if the buffer cannot be reserved.
    /// - [`DemuxError::Truncated`] if the input ends inside the payload.
    pub fn read_payload(&mut self, header: &FrameHeader) -> Result<Vec<u8>, DemuxError> {
        let len = usize::try_from(header.payload_len).map_err(|_| DemuxError::ResourceExhausted {
            requested: usize::MAX,
        })?;
        self.cursor.read_vec(len)
    }

    /// Skip the payload announced by the last header.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::Truncated`] if the input ends inside the payload.
    pub fn skip_payload(&mut self, header: &FrameHeader) -> Result<(), DemuxError> {
        self.cursor.skip(u64::from(header.payload_len))
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }
}
