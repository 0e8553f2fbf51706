use lk_types::Packet;
use lk_wire::FrameType;
use lk_wire::frame_type::stream_index;

/// One located frame, as seen by the consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DemuxEvent {
    /// A video or audio frame, decrypted where applicable.
    Packet(Packet),
    /// An auxiliary or unknown frame whose payload was skipped.
    Discarded(DiscardedFrame),
}

impl DemuxEvent {
    pub fn into_packet(self) -> Option<Packet> {
        match self {
            Self::Packet(p) => Some(p),
            Self::Discarded(_) => None,
        }
    }

    /// Absolute offset of the frame's magic sequence.
    pub fn offset(&self) -> u64 {
        match self {
            Self::Packet(p) => p.pos,
            Self::Discarded(d) => d.offset,
        }
    }
}

/// A frame that produced no packet. It belongs to no stream, so its
/// timestamp is informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscardedFrame {
    pub frame_type: FrameType,
    pub payload_len: u32,
    pub timestamp_ms: u32,
    pub offset: u64,
}

/// Running counters for one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DemuxStats {
    /// Frames located, whatever their type.
    pub frames: u64,
    pub video_packets: u64,
    pub audio_packets: u64,
    /// Frames skipped: auxiliary plus unknown types.
    pub discarded_frames: u64,
    /// Subset of `discarded_frames` with an unrecognised type byte.
    pub unknown_frames: u64,
    /// Number of times the scanner had to skip garbage to find a frame.
    pub resync_events: u64,
    pub resync_bytes: u64,
    /// Encrypted payloads whose prefix did not end on a block boundary.
    pub unaligned_decryptions: u64,
    /// Payload bytes delivered in packets.
    pub payload_bytes: u64,
}

impl DemuxStats {
    pub fn packets(&self) -> u64 {
        self.video_packets + self.audio_packets
    }

    pub(crate) fn record_packet(&mut self, stream: usize, len: usize) {
        match stream {
            stream_index::VIDEO => self.video_packets += 1,
            _ => self.audio_packets += 1,
        }
        self.payload_bytes += len as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_of_either_kind() {
        let packet = DemuxEvent::Packet(Packet::new(0, 5, 120, vec![0u8; 3]));
        assert_eq!(packet.offset(), 120);
        assert!(packet.into_packet().is_some());

        let skipped = DemuxEvent::Discarded(DiscardedFrame {
            frame_type: FrameType::Auxiliary,
            payload_len: 8,
            timestamp_ms: 5,
            offset: 40,
        });
        assert_eq!(skipped.offset(), 40);
        assert!(skipped.into_packet().is_none());
    }

    #[test]
    fn packet_totals() {
        let mut stats = DemuxStats::default();
        stats.record_packet(stream_index::VIDEO, 10);
        stats.record_packet(stream_index::AUDIO, 4);
        stats.record_packet(stream_index::AUDIO, 4);
        assert_eq!(stats.packets(), 3);
        assert_eq!(stats.audio_packets, 2);
        assert_eq!(stats.payload_bytes, 18);
    }
}
