#![warn(clippy::pedantic)]

pub mod error;
pub mod frame_type;
pub mod header;
pub mod probe;
pub mod sync;

pub use error::WireError;
pub use frame_type::{FrameRoute, FrameType};
pub use header::FrameHeader;
pub use sync::{FrameSync, SyncStep};
