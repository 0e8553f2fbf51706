/// Implementation of `lk7777 demux`.
///
/// Decrypts a capture and writes one elementary stream per logical
/// stream into the output directory, named after the stream's codec.
///
/// # Output format
///
/// ```text
/// video.h264: 412 packets, 1843210 bytes
/// audio.mp2:  388 packets, 162144 bytes
/// 11 frames skipped (2 unknown), 0 bytes resynced
/// ```
///
/// Packets are appended in file order; timestamps are not written, the
/// elementary streams carry their own timing.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lk_demux::{DemuxConfig, Demuxer, Lk7777Demuxer};
use lk_types::StreamInfo;
use tracing::info;

use crate::DemuxArgs;

struct Output {
    path: PathBuf,
    writer: BufWriter<File>,
    packets: u64,
    bytes: u64,
}

impl Output {
    fn create(dir: &Path, stream: &StreamInfo) -> Result<Self> {
        let path = dir.join(file_name(stream));
        let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        info!(stream = stream.index, codec = %stream.codec, path = %path.display(), "writing elementary stream");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            packets: 0,
            bytes: 0,
        })
    }
}

/// `video.h264` / `audio.mp2`.
fn file_name(stream: &StreamInfo) -> String {
    format!("{}.{}", stream.media_type, stream.codec.extension())
}

/// Run the `lk7777 demux` command.
///
/// # Errors
///
/// Returns an error if the key is missing or malformed, if the output
/// files cannot be written, or if the stream is corrupt or truncated.
/// Packets read before the failure are still flushed to disk.
pub fn run(args: &DemuxArgs) -> Result<()> {
    let config = DemuxConfig::from_hex_key(args.key.as_deref()).context("--key / LK7777_KEY")?;

    let file = File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut demuxer = Lk7777Demuxer::open(BufReader::new(file), &config)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut outputs = demuxer
        .streams()
        .iter()
        .map(|s| Output::create(&args.output, s))
        .collect::<Result<Vec<_>>>()?;

    let result = drain(&mut demuxer, &mut outputs);

    for out in &mut outputs {
        out.writer
            .flush()
            .with_context(|| format!("cannot write {}", out.path.display()))?;
    }
    result.with_context(|| format!("failed to demux {}", args.file.display()))?;

    for out in &outputs {
        let name = out.path.file_name().map_or_else(
            || out.path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        println!("{:<11} {} packets, {} bytes", format!("{name}:"), out.packets, out.bytes);
    }

    let stats = demuxer.close();
    println!(
        "{} frames skipped ({} unknown), {} bytes resynced",
        stats.discarded_frames, stats.unknown_frames, stats.resync_bytes
    );
    Ok(())
}

fn drain<R: std::io::Read>(demuxer: &mut Lk7777Demuxer<R>, outputs: &mut [Output]) -> Result<()> {
    while let Some(packet) = demuxer.read_packet()? {
        let out = outputs
            .get_mut(packet.stream_index)
            .with_context(|| format!("packet for unknown stream {}", packet.stream_index))?;
        out.writer
            .write_all(&packet.data)
            .with_context(|| format!("cannot write {}", out.path.display()))?;
        out.packets += 1;
        out.bytes += packet.data.len() as u64;
    }
    Ok(())
}
