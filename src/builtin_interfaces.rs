//! `builtin_interfaces` — the wire-stable timestamp shape.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time, matching `builtin_interfaces/msg/Time`: `nanosec` is
/// always `< 1_000_000_000`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
  pub sec: i32,
  pub nanosec: u32,
}

impl Time {
  pub const ZERO: Time = Time { sec: 0, nanosec: 0 };

  pub fn new(sec: i32, nanosec: u32) -> Time {
    debug_assert!(nanosec < 1_000_000_000, "nanosec must be < 1_000_000_000");
    Time { sec, nanosec }
  }

  pub fn is_zero(&self) -> bool {
    self.sec == 0 && self.nanosec == 0
  }

  /// Current wall-clock time, used by a [`crate::clock::SteadyClock`] stand-in
  /// when no explicit clock source is supplied.
  pub fn now() -> Time {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Time {
      sec: d.as_secs() as i32,
      nanosec: d.subsec_nanos(),
    }
  }

  /// Nanoseconds elapsed from `earlier` to `self`. Saturates at zero if
  /// `self` is actually before `earlier`.
  pub fn saturating_nanos_since(&self, earlier: &Time) -> u64 {
    let self_ns = (self.sec as i64) * 1_000_000_000 + self.nanosec as i64;
    let earlier_ns = (earlier.sec as i64) * 1_000_000_000 + earlier.nanosec as i64;
    (self_ns - earlier_ns).max(0) as u64
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_time_is_zero() {
    assert!(Time::ZERO.is_zero());
    assert!(!Time::new(1, 0).is_zero());
  }

  #[test]
  fn ordering_is_lexicographic_sec_then_nanosec() {
    assert!(Time::new(1, 0) < Time::new(1, 1));
    assert!(Time::new(1, 999_999_999) < Time::new(2, 0));
  }
}
