use lk_types::{CodecId, ParseRequirement, StreamInfo, TimeBase, TypeError};
use lk_wire::frame_type::stream_index;

/// Number of logical streams in every lk7777 session.
pub const STREAM_COUNT: usize = 2;

/// The fixed stream table of a session.
///
/// ```text
/// ┌───────┬───────┬───────┬──────────────┬───────────┐
/// │ Index │ Media │ Codec │ Parsing      │ Time base │
/// ├───────┼───────┼───────┼──────────────┼───────────┤
/// │ 0     │ video │ H.264 │ full, raw    │ 1/1000    │
/// │ 1     │ audio │ MP2   │ full, raw    │ 1/1000    │
/// └───────┴───────┴───────┴──────────────┴───────────┘
/// ```
///
/// Built once at open time and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRegistry {
    streams: [StreamInfo; STREAM_COUNT],
}

impl StreamRegistry {
    pub fn lk7777() -> Self {
        let tb = TimeBase::MILLISECONDS;
        Self {
            streams: [
                StreamInfo::new(stream_index::VIDEO, CodecId::H264, tb)
                    .with_parsing(ParseRequirement::FullRaw),
                StreamInfo::new(stream_index::AUDIO, CodecId::Mp2, tb)
                    .with_parsing(ParseRequirement::FullRaw),
            ],
        }
    }

    pub fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    /// Look up a stream by index.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownStream`] for an index outside the table.
    pub fn get(&self, index: usize) -> Result<&StreamInfo, TypeError> {
        self.streams.get(index).ok_or(TypeError::UnknownStream {
            index,
            count: STREAM_COUNT,
        })
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::lk7777()
    }
}
