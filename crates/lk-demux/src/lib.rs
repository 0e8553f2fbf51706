#![warn(clippy::pedantic)]

pub mod config;
pub mod cursor;
pub mod decryption;
pub mod demuxer;
pub mod error;
pub mod event;
pub mod frame_reader;
pub mod registry;
pub mod streaming;

mod dispatch;

pub use config::{ConfigError, DecryptionKey, DemuxConfig};
pub use cursor::ByteCursor;
pub use decryption::{Aes128Ecb, BlockDecryptor, PartialDecryption, decrypt_prefix};
pub use demuxer::{Demuxer, FormatDescriptor, FormatFlags, LK7777_FORMAT, Lk7777Demuxer, SessionState};
pub use error::DemuxError;
pub use event::{DemuxEvent, DemuxStats, DiscardedFrame};
pub use frame_reader::{FrameInfo, FrameReader};
pub use registry::{STREAM_COUNT, StreamRegistry};
pub use streaming::StreamingDemuxer;
