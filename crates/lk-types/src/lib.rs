#![warn(clippy::pedantic)]

pub mod error;
pub mod media;
pub mod packet;
pub mod stream;
pub mod time_base;

pub use error::TypeError;
pub use media::{CodecId, MediaType, ParseRequirement};
pub use packet::Packet;
pub use stream::StreamInfo;
pub use time_base::TimeBase;
