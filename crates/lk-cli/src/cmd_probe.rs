/// Implementation of `lk7777 probe`.
///
/// Reads the first bytes of the file and prints the score the lk7777
/// probe assigns to them.
///
/// # Output format
///
/// ```text
/// capture.lk: lk7777 (LK 7777 Streaming), score 32/100
/// other.ts: not recognised, score 0/100
/// ```
use std::fs::File;
use std::io::Read;

use anyhow::{Context, Result};
use lk_demux::{Demuxer, Lk7777Demuxer};
use lk_wire::header::HEADER_SIZE;
use lk_wire::probe::PROBE_SCORE_MAX;

use crate::ProbeArgs;

/// Run the `lk7777 probe` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn run(args: &ProbeArgs) -> Result<()> {
    let file = File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut head = Vec::with_capacity(HEADER_SIZE);
    file.take(HEADER_SIZE as u64)
        .read_to_end(&mut head)
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    println!("{}: {}", args.file.display(), describe(&head));
    Ok(())
}

fn describe(head: &[u8]) -> String {
    let score = <Lk7777Demuxer<&[u8]> as Demuxer>::probe(head);
    if score == 0 {
        format!("not recognised, score 0/{PROBE_SCORE_MAX}")
    } else {
        let format = <Lk7777Demuxer<&[u8]> as Demuxer>::descriptor();
        format!(
            "{} ({}), score {score}/{PROBE_SCORE_MAX}",
            format.name, format.long_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_file() {
        assert_eq!(
            describe(b"tGt\x00\x00\x00\x00\x04\x00\x00\x00\x00"),
            "lk7777 (LK 7777 Streaming), score 32/100"
        );
    }

    #[test]
    fn unrecognised_file() {
        assert_eq!(describe(&[0x47, 0x40, 0x00]), "not recognised, score 0/100");
        assert_eq!(describe(b""), "not recognised, score 0/100");
    }
}
