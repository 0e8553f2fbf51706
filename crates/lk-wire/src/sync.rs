use crate::header::{MAGIC, MAGIC_LEN};

/// Maximum number of bytes discarded while searching for one magic
/// sequence before the stream is declared corrupt.
pub const MAX_RESYNC_BYTES: u32 = 200_000;

/// Result of feeding one byte to a [`FrameSync`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStep {
    /// No frame boundary yet. `skipped` bytes have been discarded so far;
    /// it becomes 1 on the byte that moves the scanner into resync.
    Pending { skipped: u32 },
    /// The window holds the magic sequence; the frame header follows.
    Locked { skipped: u32 },
    /// The resync budget is spent and the window still does not match.
    Exhausted { skipped: u32 },
}

impl SyncStep {
    /// Bytes discarded so far in the current search.
    pub fn skipped(self) -> u32 {
        match self {
            Self::Pending { skipped } | Self::Locked { skipped } | Self::Exhausted { skipped } => {
                skipped
            }
        }
    }

    /// `true` on the byte that first moved the search into resync,
    /// whether or not that same byte also completed the magic sequence.
    pub fn entered_resync(self) -> bool {
        self.skipped() == 1
    }
}

/// Three-byte sliding window over the input, looking for [`MAGIC`].
///
/// Bytes are pushed one at a time. The first three fill the window; each
/// further byte shifts the window left by one and discards the oldest
/// byte, which counts against the resync budget.
///
/// ```text
///   push 0x00 0x74 0x47     window = [00 74 47]   Pending { skipped: 0 }
///   push 0x74               window = [74 47 74]   Locked  { skipped: 1 }
/// ```
///
/// The state machine does no I/O, so the blocking and the async demuxer
/// drive the same scanner and agree on every offset.
#[derive(Clone, Debug)]
pub struct FrameSync {
    window: [u8; MAGIC_LEN],
    filled: usize,
    skipped: u32,
    budget: u32,
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSync {
    /// Scanner with the protocol budget of [`MAX_RESYNC_BYTES`].
    pub fn new() -> Self {
        Self::with_budget(MAX_RESYNC_BYTES)
    }

    pub fn with_budget(budget: u32) -> Self {
        Self {
            window: [0; MAGIC_LEN],
            filled: 0,
            skipped: 0,
            budget,
        }
    }

    /// Feed the next input byte.
    ///
    /// Once `Locked` or `Exhausted` has been returned the scanner must be
    /// [`reset`](Self::reset) before it is fed again.
    pub fn push(&mut self, byte: u8) -> SyncStep {
        if self.filled < MAGIC_LEN {
            self.window[self.filled] = byte;
            self.filled += 1;
            if self.filled < MAGIC_LEN {
                return SyncStep::Pending { skipped: 0 };
            }
        } else {
            self.window.rotate_left(1);
            self.window[MAGIC_LEN - 1] = byte;
            self.skipped += 1;
        }

        if self.window == MAGIC {
            SyncStep::Locked {
                skipped: self.skipped,
            }
        } else if self.skipped >= self.budget {
            SyncStep::Exhausted {
                skipped: self.skipped,
            }
        } else {
            SyncStep::Pending {
                skipped: self.skipped,
            }
        }
    }

    /// Forget the window contents and the skip count.
    pub fn reset(&mut self) {
        self.filled = 0;
        self.skipped = 0;
    }

    /// Bytes discarded during the current search.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Bytes consumed from the input during the current search.
    pub fn consumed(&self) -> u64 {
        self.filled as u64 + u64::from(self.skipped)
    }

    /// `true` once at least one byte of the current search was consumed.
    pub fn is_started(&self) -> bool {
        self.filled > 0
    }
}
