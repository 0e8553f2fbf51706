use std::time::Duration;

use bytes::Bytes;

use crate::time_base::TimeBase;

/// One elementary-stream packet handed to the consumer.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────┐
/// │ Field        │ Meaning                                       │
/// ├──────────────┼───────────────────────────────────────────────┤
/// │ stream_index │ Target logical stream                         │
/// │ pts / dts    │ Frame timestamp, in the stream's time base    │
/// │ pos          │ Byte offset of the frame in the input         │
/// │ data         │ Payload, already decrypted where applicable   │
/// │ encrypted    │ Whether the payload prefix was decrypted      │
/// └──────────────┴───────────────────────────────────────────────┘
/// ```
///
/// The lk7777 wire format carries one timestamp per frame, so `pts` and
/// `dts` are always equal for packets it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
  pub stream_index: usize,
  pub pts: i64,
  pub dts: i64,
  pub pos: u64,
  pub data: Bytes,
  pub encrypted: bool,
}

impl Packet {
  /// Build a packet whose presentation and decode times are the same.
  pub fn new(stream_index: usize, timestamp: i64, pos: u64, data: impl Into<Bytes>) -> Self {
    Self {
      stream_index,
      pts: timestamp,
      dts: timestamp,
      pos,
      data: data.into(),
      encrypted: false,
    }
  }

  #[must_use]
  pub fn with_encrypted(mut self, encrypted: bool) -> Self {
    self.encrypted = encrypted;
    self
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Presentation time as a duration, given the packet's stream time base.
  pub fn presentation_time(&self, time_base: TimeBase) -> Option<Duration> {
    time_base.to_duration(self.pts)
  }
}
