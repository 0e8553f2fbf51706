/// Implementation of `lk7777 validate`.
///
/// Decrypts and reads every frame of the capture, then reports either a
/// series of success checkmarks (`✓`) or a diagnostic failure line (`✗`).
/// The command exits with code 0 on a clean stream and code 1 on any
/// error (the main dispatcher in `main.rs` converts `Err` to exit code 1).
///
/// # Success output
///
/// ```text
/// ✓ Format: lk7777 (probe score 32/100)
/// ✓ Frames: 812 frames read to end of stream
/// ✓ Packets: 412 video, 388 audio
/// ✓ Skipped: 12 frames (2 unknown type)
/// ✓ Resync: no garbage between frames
/// ```
///
/// Resynced garbage and unaligned encrypted prefixes are tolerated by the
/// demuxer; they are reported with `!` but do not fail validation.
///
/// # Failure output
///
/// ```text
/// ✗ Error: corrupt stream at offset 200403: no frame boundary within 200000 bytes
/// ```
use std::fs::File;
use std::io::{BufReader, Read};

use anyhow::{Context, Result, anyhow};
use lk_demux::{DemuxConfig, DemuxError, DemuxStats, Demuxer, Lk7777Demuxer};
use lk_wire::header::MAGIC_LEN;
use lk_wire::probe::PROBE_SCORE_MAX;

use crate::ValidateArgs;

/// Run the `lk7777 validate` command.
///
/// # Errors
///
/// Returns an error if the key is missing or malformed, the file cannot
/// be read, or the stream is corrupt or truncated.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let config = DemuxConfig::from_hex_key(args.key.as_deref()).context("--key / LK7777_KEY")?;

    let file = File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut reader = BufReader::new(file);

    let mut head = [0u8; MAGIC_LEN];
    let head_len = read_head(&mut reader, &mut head)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let score = <Lk7777Demuxer<&[u8]> as Demuxer>::probe(&head[..head_len]);
    if score == 0 {
        println!("! Format: file does not start on a frame boundary");
    } else {
        println!("✓ Format: lk7777 (probe score {score}/{PROBE_SCORE_MAX})");
    }

    let source = Read::chain(&head[..head_len], reader);
    let mut demuxer = Lk7777Demuxer::open(source, &config)?;

    loop {
        match demuxer.read_frame() {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                println!("✗ Error: {}", diagnostic(&e));
                return Err(anyhow!("validation failed"));
            }
        }
    }

    report(demuxer.stats());
    Ok(())
}

/// Fill `head` as far as the input allows; returns the bytes read.
fn read_head<R: Read>(reader: &mut R, head: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < head.len() {
        match reader.read(&mut head[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn report(stats: &DemuxStats) {
    println!("✓ Frames: {} frames read to end of stream", stats.frames);
    println!(
        "✓ Packets: {} video, {} audio",
        stats.video_packets, stats.audio_packets
    );
    println!(
        "✓ Skipped: {} frames ({} unknown type)",
        stats.discarded_frames, stats.unknown_frames
    );
    if stats.resync_events == 0 {
        println!("✓ Resync: no garbage between frames");
    } else {
        println!(
            "! Resync: {} bytes skipped in {} places",
            stats.resync_bytes, stats.resync_events
        );
    }
    if stats.unaligned_decryptions > 0 {
        println!(
            "! Decryption: {} payloads with a partial trailing block left as received",
            stats.unaligned_decryptions
        );
    }
}

// ── Error formatting ──────────────────────────────────────────────────────────

/// Converts a `DemuxError` into a human-readable diagnostic string.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────┐
/// │ DemuxError       │ Diagnostic message prefix                    │
/// ├──────────────────┼──────────────────────────────────────────────┤
/// │ StreamCorruption │ "corrupt stream at offset N: ..."           │
/// │ Truncated        │ "truncated at offset N: ..."                │
/// │ InvalidFrame     │ "invalid frame at offset N: <wire error>"   │
/// │ anything else    │ "<error Display>"                            │
/// └──────────────────┴──────────────────────────────────────────────┘
/// ```
fn diagnostic(e: &DemuxError) -> String {
    match e {
        DemuxError::StreamCorruption { skipped, offset } => {
            format!("corrupt stream at offset {offset}: no frame boundary within {skipped} bytes")
        }
        DemuxError::Truncated {
            offset,
            needed,
            available,
        } => format!("truncated at offset {offset}: needed {needed} bytes, {available} present"),
        DemuxError::InvalidFrame { offset, source } => {
            format!("invalid frame at offset {offset}: {source}")
        }
        other => other.to_string(),
    }
}
