use crate::media::{CodecId, MediaType, ParseRequirement};
use crate::time_base::TimeBase;

/// Descriptor of one logical output stream.
///
/// Streams are created when a session opens and never change afterwards;
/// packets refer to them by `index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
  pub index: usize,
  pub media_type: MediaType,
  pub codec: CodecId,
  pub need_parsing: ParseRequirement,
  pub time_base: TimeBase,
}

impl StreamInfo {
  /// Create a stream whose media type follows from its codec.
  pub fn new(index: usize, codec: CodecId, time_base: TimeBase) -> Self {
    Self {
      index,
      media_type: codec.media_type(),
      codec,
      need_parsing: ParseRequirement::default(),
      time_base,
    }
  }

  /// Set the parse requirement announced to the consumer.
  #[must_use]
  pub fn with_parsing(mut self, need_parsing: ParseRequirement) -> Self {
    self.need_parsing = need_parsing;
    self
  }

  pub fn is_video(&self) -> bool {
    self.media_type == MediaType::Video
  }

  pub fn is_audio(&self) -> bool {
    self.media_type == MediaType::Audio
  }
}
