use crate::header::{MAGIC, MAGIC_LEN};

/// Highest score any format probe can report.
pub const PROBE_SCORE_MAX: u32 = 100;

/// Score reported on a magic match.
///
/// A 3-byte signature is weak evidence, so the score stays at roughly a
/// third of the maximum, one point under it, to rank below formats with
/// stronger signatures.
pub const LK7777_PROBE_SCORE: u32 = PROBE_SCORE_MAX / 3 - 1;

/// Score how likely `buf` is to be the start of an lk7777 stream.
///
/// Only the first three bytes are examined.
pub fn probe(buf: &[u8]) -> u32 {
    if buf.len() >= MAGIC_LEN && buf[..MAGIC_LEN] == MAGIC {
        LK7777_PROBE_SCORE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_scores_moderately() {
        let score = probe(&[0x74, 0x47, 0x74]);
        assert_eq!(score, 32);
        assert!(score > 0 && score < PROBE_SCORE_MAX);
    }

    #[test]
    fn zeros_score_nothing() {
        assert_eq!(probe(&[0x00, 0x00, 0x00]), 0);
    }

    #[test]
    fn short_buffer_scores_nothing() {
        assert_eq!(probe(&[0x74, 0x47]), 0);
        assert_eq!(probe(&[]), 0);
    }

    #[test]
    fn only_the_first_three_bytes_matter() {
        assert_eq!(probe(b"tGt followed by anything"), LK7777_PROBE_SCORE);
        assert_eq!(probe(b"xtGt"), 0);
    }
}
