use lk_types::Packet;
use lk_wire::{FrameRoute, FrameType};
use tracing::debug;

use crate::decryption::{BlockDecryptor, decrypt_prefix};
use crate::event::{DemuxEvent, DemuxStats, DiscardedFrame};
use crate::frame_reader::FrameInfo;

/// Turns located frames into events.
///
/// The I/O side (reading or skipping the payload) stays with the caller,
/// so the blocking and the async demuxer share this type unchanged:
///
/// ```text
///   let route = dispatcher.route(&info);
///   match route {
///       Keep { .. } => dispatcher.packet(&info, route, reader.read_payload()?),
///       Discard     => { reader.skip_payload()?; dispatcher.discarded(&info) }
///   }
/// ```
pub(crate) struct Dispatcher {
    decryptor: Box<dyn BlockDecryptor + Send>,
    stats: DemuxStats,
}

impl Dispatcher {
    pub(crate) fn new(decryptor: Box<dyn BlockDecryptor + Send>) -> Self {
        Self {
            decryptor,
            stats: DemuxStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> &DemuxStats {
        &self.stats
    }

    /// Account for a newly located frame and decide what to do with it.
    pub(crate) fn route(&mut self, info: &FrameInfo) -> FrameRoute {
        self.stats.frames += 1;
        if info.resync_skipped > 0 {
            self.stats.resync_events += 1;
            self.stats.resync_bytes += u64::from(info.resync_skipped);
        }
        info.header.frame_type.route()
    }

    /// Build the packet for a kept frame, decrypting its prefix if needed.
    pub(crate) fn packet(
        &mut self,
        info: &FrameInfo,
        stream_index: usize,
        encrypted: bool,
        mut payload: Vec<u8>,
    ) -> DemuxEvent {
        if encrypted {
            let result = decrypt_prefix(self.decryptor.as_ref(), &mut payload);
            if !result.is_aligned() {
                self.stats.unaligned_decryptions += 1;
            }
        }

        self.stats.record_packet(stream_index, payload.len());
        let packet = Packet::new(
            stream_index,
            i64::from(info.header.timestamp_ms),
            info.offset,
            payload,
        )
        .with_encrypted(encrypted);
        DemuxEvent::Packet(packet)
    }

    /// Record a skipped frame.
    pub(crate) fn discarded(&mut self, info: &FrameInfo) -> DemuxEvent {
        let header = info.header;
        self.stats.discarded_frames += 1;
        match header.frame_type {
            FrameType::Unknown(id) => {
                self.stats.unknown_frames += 1;
                debug!(
                    frame_type = id,
                    payload_len = header.payload_len,
                    offset = info.offset,
                    "unknown frame type, payload skipped"
                );
            }
            _ => debug!(
                payload_len = header.payload_len,
                offset = info.offset,
                "auxiliary frame skipped"
            ),
        }

        DemuxEvent::Discarded(DiscardedFrame {
            frame_type: header.frame_type,
            payload_len: header.payload_len,
            timestamp_ms: header.timestamp_ms,
            offset: info.offset,
        })
    }
}
