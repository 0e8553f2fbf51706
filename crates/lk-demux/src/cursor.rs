use std::io::{self, Read};

use crate::error::DemuxError;

/// Fail with [`DemuxError::Truncated`] unless a read that started at
/// `offset` got all `needed` bytes.
pub(crate) fn ensure_complete(offset: u64, needed: u64, available: u64) -> Result<(), DemuxError> {
    if available < needed {
        return Err(DemuxError::Truncated {
            offset,
            needed,
            available,
        });
    }
    Ok(())
}

/// Sequential byte source with position tracking.
///
/// Every read advances `position` by exactly the number of bytes taken
/// from the inner reader, so frame offsets reported by the demuxer are
/// absolute offsets into the input.
///
/// Reads are issued one byte at a time while scanning for a frame
/// boundary; wrap unbuffered sources (files, sockets) in a
/// [`std::io::BufReader`] first.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Read one byte, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error other than `Interrupted`.
    pub fn try_read_u8(&mut self) -> Result<Option<u8>, DemuxError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Fill `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::Truncated`] if the input ends first. The bytes
    /// that were available are still consumed.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DemuxError> {
        let start = self.pos;
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return ensure_complete(start, buf.len() as u64, filled as u64),
                Ok(n) => {
                    filled += n;
                    self.pos += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read a fixed-size array.
    ///
    /// # Errors
    ///
    /// See [`read_exact`](Self::read_exact).
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DemuxError> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// See [`read_exact`](Self::read_exact).
    pub fn read_u32_be(&mut self) -> Result<u32, DemuxError> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Read exactly `len` bytes into a freshly allocated buffer.
    ///
    /// The buffer is reserved up front so an absurd declared length fails
    /// cleanly instead of aborting the process.
    ///
    /// # Errors
    ///
    /// - [`DemuxError::ResourceExhausted`] if the buffer cannot be reserved.
    /// - [`DemuxError::Truncated`] if fewer than `len` bytes remain.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, DemuxError> {
        let start = self.pos;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| DemuxError::ResourceExhausted { requested: len })?;

        let read = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.pos += read as u64;

        ensure_complete(start, len as u64, read as u64)?;
        Ok(buf)
    }

    /// Discard exactly `len` bytes without buffering them.
    ///
    /// # Errors
    ///
    /// Returns [`DemuxError::Truncated`] if fewer than `len` bytes remain.
    pub fn skip(&mut self, len: u64) -> Result<(), DemuxError> {
        let start = self.pos;
        let skipped = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.pos += skipped;

        ensure_complete(start, len, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tracks_position_across_reads() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![1, 0, 0, 0, 2, 9, 9, 9]));
        assert_eq!(cursor.try_read_u8().unwrap(), Some(1));
        assert_eq!(cursor.read_u32_be().unwrap(), 2);
        assert_eq!(cursor.position(), 5);
        cursor.skip(2).unwrap();
        assert_eq!(cursor.read_vec(1).unwrap(), vec![9]);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.try_read_u8().unwrap(), None);
    }

    #[test]
    fn short_read_reports_truncation() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0u8; 5]));
        cursor.skip(2).unwrap();
        let err = cursor.read_vec(10).unwrap_err();
        assert!(matches!(
            err,
            DemuxError::Truncated {
                offset: 2,
                needed: 10,
                available: 3
            }
        ));
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn short_skip_reports_truncation() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0u8; 4]));
        let err = cursor.skip(100).unwrap_err();
        assert!(matches!(
            err,
            DemuxError::Truncated {
                offset: 0,
                needed: 100,
                available: 4
            }
        ));
    }

    #[test]
    fn short_array_reports_truncation() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0u8; 3]));
        let err = cursor.read_array::<9>().unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn completeness_check() {
        ensure_complete(4, 8, 8).unwrap();
        ensure_complete(4, 0, 0).unwrap();
        assert!(matches!(
            ensure_complete(4, 8, 5),
            Err(DemuxError::Truncated {
                offset: 4,
                needed: 8,
                available: 5
            })
        ));
    }

    #[test]
    fn zero_length_reads_succeed_at_eof() {
        let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
        assert!(cursor.read_vec(0).unwrap().is_empty());
        cursor.skip(0).unwrap();
    }

    #[test]
    fn huge_length_is_resource_exhaustion() {
        let mut cursor = ByteCursor::new(Cursor::new(Vec::new()));
        let err = cursor.read_vec(usize::MAX).unwrap_err();
        assert!(matches!(err, DemuxError::ResourceExhausted { .. }));
    }
}
