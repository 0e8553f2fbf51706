use std::fmt;
use std::time::Duration;

use crate::error::TypeError;

/// Rational unit in which a stream's timestamps are expressed.
///
/// A timestamp `t` in time base `num/den` is `t * num / den` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeBase {
  num: u32,
  den: u32,
}

impl TimeBase {
  /// One millisecond. Every lk7777 stream uses this.
  pub const MILLISECONDS: Self = Self { num: 1, den: 1000 };

  /// Create a time base.
  ///
  /// # Errors
  ///
  /// Returns [`TypeError::InvalidTimeBase`] if either part is zero.
  pub fn new(num: u32, den: u32) -> Result<Self, TypeError> {
    if num == 0 || den == 0 {
      return Err(TypeError::InvalidTimeBase { num, den });
    }
    Ok(Self { num, den })
  }

  pub fn num(self) -> u32 {
    self.num
  }

  pub fn den(self) -> u32 {
    self.den
  }

  /// Convert a timestamp in this time base to a wall-clock duration.
  ///
  /// Returns `None` for negative timestamps or on overflow.
  pub fn to_duration(self, ts: i64) -> Option<Duration> {
    let ts = u128::try_from(ts).ok()?;
    let nanos = ts
      .checked_mul(u128::from(self.num))?
      .checked_mul(1_000_000_000)?
      / u128::from(self.den);
    let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
    #[allow(clippy::cast_possible_truncation)]
    let sub = (nanos % 1_000_000_000) as u32;
    Some(Duration::new(secs, sub))
  }
}

impl fmt::Display for TimeBase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.num, self.den)
  }
}
