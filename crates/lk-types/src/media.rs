use std::fmt;

/// Kind of elementary stream carried by a logical stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
  Video,
  Audio,
}

impl fmt::Display for MediaType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Video => "video",
      Self::Audio => "audio",
    })
  }
}

/// Codec identity announced for a logical stream.
///
/// The demuxer never looks inside the payloads; the codec is part of the
/// fixed stream topology and only tells the consumer which decoder to use.
///
/// ```text
/// ┌───────┬────────────┬───────────┐
/// │ Codec │ Media type │ Extension │
/// ├───────┼────────────┼───────────┤
/// │ H264  │ Video      │ .h264     │
/// │ Mp2   │ Audio      │ .mp2      │
/// └───────┴────────────┴───────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecId {
  /// ITU-T H.264 / MPEG-4 AVC, Annex B byte stream.
  H264,
  /// MPEG-1 Audio Layer II.
  Mp2,
}

impl CodecId {
  /// Human-readable codec name.
  pub fn name(self) -> &'static str {
    match self {
      Self::H264 => "H.264",
      Self::Mp2 => "MP2",
    }
  }

  pub fn media_type(self) -> MediaType {
    match self {
      Self::H264 => MediaType::Video,
      Self::Mp2 => MediaType::Audio,
    }
  }

  /// File extension for a raw elementary stream of this codec.
  pub fn extension(self) -> &'static str {
    match self {
      Self::H264 => "h264",
      Self::Mp2 => "mp2",
    }
  }
}

impl fmt::Display for CodecId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// How much parsing the downstream consumer must do on the packets.
///
/// A container that frames by transport chunks rather than by access
/// units hands out packets whose boundaries mean nothing to the codec;
/// `FullRaw` tells the consumer to re-split the elementary stream itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseRequirement {
  /// Packets are complete access units.
  #[default]
  None,
  /// Full parsing of a raw elementary stream; packet boundaries are arbitrary.
  FullRaw,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codec_identities() {
    assert_eq!(CodecId::H264.name(), "H.264");
    assert_eq!(CodecId::Mp2.name(), "MP2");
    assert_eq!(CodecId::H264.media_type(), MediaType::Video);
    assert_eq!(CodecId::Mp2.media_type(), MediaType::Audio);
  }

  #[test]
  fn display_uses_names() {
    assert_eq!(CodecId::Mp2.to_string(), "MP2");
    assert_eq!(MediaType::Video.to_string(), "video");
  }
}
