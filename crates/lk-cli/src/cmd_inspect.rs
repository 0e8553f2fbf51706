/// Implementation of `lk7777 inspect`.
///
/// Walks the frame headers of a capture and prints one line per frame.
/// Payloads are skipped, never decrypted, so no key is required.
///
/// # Output format
///
/// ```text
/// @0        video     type=0x00 len=5      ts=0
/// @17       video/enc type=0x80 len=1030   ts=40
/// @1059     aux       type=0x82 len=8      ts=40
/// @1082     audio/enc type=0x81 len=256    ts=52 resync=3
/// ---
/// 4 frames, 1350 bytes
/// ```
///
/// With `--json`, each frame is a JSON object on its own line.
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use lk_demux::{FrameInfo, FrameReader};
use serde::Serialize;

use crate::InspectArgs;

#[derive(Serialize)]
struct FrameRow<'a> {
    offset: u64,
    frame_type: u8,
    label: &'a str,
    payload_len: u32,
    timestamp_ms: u32,
    resync_skipped: u32,
}

impl<'a> From<&'a FrameInfo> for FrameRow<'a> {
    fn from(info: &'a FrameInfo) -> Self {
        Self {
            offset: info.offset,
            frame_type: info.header.frame_type.wire_id(),
            label: info.header.frame_type.label(),
            payload_len: info.header.payload_len,
            timestamp_ms: info.header.timestamp_ms,
            resync_skipped: info.resync_skipped,
        }
    }
}

/// Run the `lk7777 inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if the stream is
/// corrupt or truncated before `--limit` frames were listed.
pub fn run(args: &InspectArgs) -> Result<()> {
    let file = File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut reader = FrameReader::new(BufReader::new(file));
    let limit = args.limit.unwrap_or(usize::MAX);

    let mut count = 0usize;
    while count < limit {
        let Some(info) = reader
            .next_header()
            .with_context(|| format!("failed to read frame {count}"))?
        else {
            break;
        };

        if args.json {
            println!("{}", serde_json::to_string(&FrameRow::from(&info))?);
        } else {
            println!("{info}");
        }

        reader
            .skip_payload(&info.header)
            .with_context(|| format!("frame {count} at offset {} is cut short", info.offset))?;
        count += 1;
    }

    if !args.json {
        println!("---");
        println!(
            "{count} frame{}, {} bytes",
            if count == 1 { "" } else { "s" },
            reader.position()
        );
    }
    Ok(())
}
