/// Errors raised when building or looking up media-level descriptors.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── InvalidTimeBase for a zero numerator/denom    │
/// │   └── UnknownStream for an index outside the table  │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
  /// A time base must be a positive rational.
  #[error("invalid time base {num}/{den}")]
  InvalidTimeBase { num: u32, den: u32 },

  /// A packet or lookup referenced a stream that does not exist.
  #[error("no stream with index {index} (session has {count} streams)")]
  UnknownStream { index: usize, count: usize },
}
