use lk_types::StreamInfo;
use lk_wire::header::{HEADER_TAIL_SIZE, MAGIC_LEN};
use lk_wire::{FrameHeader, FrameRoute, FrameSync};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::DemuxConfig;
use crate::cursor::ensure_complete;
use crate::decryption::{Aes128Ecb, BlockDecryptor};
use crate::demuxer::SessionState;
use crate::dispatch::Dispatcher;
use crate::error::DemuxError;
use crate::event::{DemuxEvent, DemuxStats};
use crate::frame_reader::{self, FrameInfo, ScanOutcome};
use crate::registry::StreamRegistry;

/// Asynchronous lk7777 demuxer. Yields one frame event at a time from
/// an `AsyncRead` source such as a socket or a pipe.
///
/// It runs the same sync window, header parser, dispatch table and
/// partial decryptor as [`Lk7777Demuxer`](crate::Lk7777Demuxer), so
/// both produce identical events for identical input. Backpressure is
/// natural: nothing is read until the caller awaits the next event.
///
/// The magic search reads byte by byte; wrap raw sockets and files in a
/// [`tokio::io::BufReader`].
///
/// # Example
///
/// ```rust,no_run
/// use lk_demux::{DemuxConfig, DemuxEvent, StreamingDemuxer};
/// use tokio::io::AsyncRead;
///
/// async fn count_packets(reader: impl AsyncRead + Unpin, config: &DemuxConfig) -> usize {
///     let mut stream = StreamingDemuxer::open(reader, config);
///     let mut packets = 0;
///     while let Some(event) = stream.next().await.transpose().unwrap() {
///         if let DemuxEvent::Packet(_) = event {
///             packets += 1;
///         }
///     }
///     packets
/// }
/// ```
pub struct StreamingDemuxer<R> {
  reader: R,
  pos: u64,
  sync: FrameSync,
  dispatcher: Dispatcher,
  registry: StreamRegistry,
  state: SessionState,
}

impl<R: AsyncRead + Unpin> StreamingDemuxer<R> {
  /// Open a session over `reader`. No bytes are read until
  /// [`next`](Self::next) is awaited.
  #[must_use]
  pub fn open(reader: R, config: &DemuxConfig) -> Self {
    Self::with_decryptor(reader, Box::new(Aes128Ecb::new(&config.key)))
  }

  #[must_use]
  pub fn with_decryptor(reader: R, decryptor: Box<dyn BlockDecryptor + Send>) -> Self {
    let registry = StreamRegistry::lk7777();
    debug!(streams = registry.streams().len(), "lk7777 streaming session opened");
    Self {
      reader,
      pos: 0,
      sync: FrameSync::new(),
      dispatcher: Dispatcher::new(decryptor),
      registry,
      state: SessionState::Opened,
    }
  }

  pub fn streams(&self) -> &[StreamInfo] {
    self.registry.streams()
  }

  pub fn stats(&self) -> &DemuxStats {
    self.dispatcher.stats()
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn position(&self) -> u64 {
    self.pos
  }

  /// Read the next frame event.
  ///
  /// Returns `None` once the input is exhausted at a frame boundary.
  /// After a fatal error every further call yields
  /// [`DemuxError::Unusable`].
  pub async fn next(&mut self) -> Option<Result<DemuxEvent, DemuxError>> {
    match self.state {
      SessionState::Finished => return None,
      SessionState::Failed => return Some(Err(DemuxError::Unusable)),
      SessionState::Opened | SessionState::Reading => {}
    }

    match self.read_event().await {
      Ok(Some(event)) => {
        self.state = SessionState::Reading;
        Some(Ok(event))
      }
      Ok(None) => {
        debug!(offset = self.pos, "end of lk7777 stream");
        self.state = SessionState::Finished;
        None
      }
      Err(e) => {
        if e.is_fatal() {
          self.state = SessionState::Failed;
        }
        Some(Err(e))
      }
    }
  }

  /// Await events until the next packet, skipping discarded frames.
  ///
  /// # Errors
  ///
  /// Any error from [`next`](Self::next).
  pub async fn next_packet(&mut self) -> Result<Option<lk_types::Packet>, DemuxError> {
    while let Some(event) = self.next().await.transpose()? {
      if let DemuxEvent::Packet(packet) = event {
        return Ok(Some(packet));
      }
    }
    Ok(None)
  }

  /// End the session and return its counters.
  pub fn close(self) -> DemuxStats {
    let stats = *self.dispatcher.stats();
    debug!(frames = stats.frames, packets = stats.packets(), "lk7777 streaming session closed");
    stats
  }

  async fn read_event(&mut self) -> Result<Option<DemuxEvent>, DemuxError> {
    let Some(info) = self.read_header().await? else {
      return Ok(None);
    };

    let event = match self.dispatcher.route(&info) {
      FrameRoute::Keep {
        stream_index,
        encrypted,
      } => {
        let payload = self.read_payload(&info.header).await?;
        self.dispatcher.packet(&info, stream_index, encrypted, payload)
      }
      FrameRoute::Discard => {
        self.skip_payload(&info.header).await?;
        self.dispatcher.discarded(&info)
      }
    };
    Ok(Some(event))
  }

  /// Scan for the magic sequence, then read and parse the header tail.
  async fn read_header(&mut self) -> Result<Option<FrameInfo>, DemuxError> {
    let skipped = loop {
      let mut byte = [0u8; 1];
      if self.reader.read(&mut byte).await? == 0 {
        frame_reader::end_of_scan(&self.sync);
        self.sync.reset();
        return Ok(None);
      }
      self.pos += 1;
      if let ScanOutcome::Locked { skipped } =
        frame_reader::scan_byte(&mut self.sync, byte[0], self.pos)?
      {
        break skipped;
      }
    };

    let offset = self.pos - MAGIC_LEN as u64;
    let mut tail = [0u8; HEADER_TAIL_SIZE];
    let filled = self.read_full(&mut tail).await?;
    ensure_complete(offset + MAGIC_LEN as u64, HEADER_TAIL_SIZE as u64, filled as u64)?;
    frame_reader::parse_tail(&tail, offset, skipped).map(Some)
  }

  /// Read until `buf` is full or the input ends; returns the bytes read.
  async fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, DemuxError> {
    let mut filled = 0;
    while filled < buf.len() {
      let n = self.reader.read(&mut buf[filled..]).await?;
      if n == 0 {
        break;
      }
      filled += n;
      self.pos += n as u64;
    }
    Ok(filled)
  }

  async fn read_payload(&mut self, header: &FrameHeader) -> Result<Vec<u8>, DemuxError> {
    let start = self.pos;
    let len = usize::try_from(header.payload_len).map_err(|_| DemuxError::ResourceExhausted {
      requested: usize::MAX,
    })?;
    let mut buf = Vec::new();
    buf
      .try_reserve_exact(len)
      .map_err(|_| DemuxError::ResourceExhausted { requested: len })?;

    let read = (&mut self.reader)
      .take(u64::from(header.payload_len))
      .read_to_end(&mut buf)
      .await?;
    self.pos += read as u64;

    ensure_complete(start, len as u64, read as u64)?;
    Ok(buf)
  }

  async fn skip_payload(&mut self, header: &FrameHeader) -> Result<(), DemuxError> {
    let start = self.pos;
    let len = u64::from(header.payload_len);
    let mut limited = (&mut self.reader).take(len);
    let skipped = tokio::io::copy(&mut limited, &mut tokio::io::sink()).await?;
    self.pos += skipped;

    ensure_complete(start, len, skipped)
  }
}
