//! `unique_identifier_msgs` — the 16-byte opaque goal identifier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UUID_SIZE: usize = 16;

/// A goal identifier: 16 opaque bytes, compared bytewise.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UUID {
  pub bytes: [u8; UUID_SIZE],
}

impl UUID {
  pub const ZERO: UUID = UUID { bytes: [0u8; UUID_SIZE] };

  pub fn new_random() -> UUID {
    UUID { bytes: *Uuid::new_v4().as_bytes() }
  }

  pub fn is_zero(&self) -> bool {
    self.bytes == [0u8; UUID_SIZE]
  }
}

impl From<[u8; UUID_SIZE]> for UUID {
  fn from(bytes: [u8; UUID_SIZE]) -> Self {
    UUID { bytes }
  }
}

/// Alias used throughout the action protocol: a `GoalID` *is* a `UUID`.
pub type GoalId = UUID;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_is_recognized() {
    assert!(UUID::ZERO.is_zero());
    assert!(!UUID::new_random().is_zero());
  }

  #[test]
  fn equality_is_bytewise() {
    let a = UUID::from([1u8; 16]);
    let b = UUID::from([1u8; 16]);
    let c = UUID::from([2u8; 16]);
    assert_eq!(a, b);
    assert_ne!(a, c);
  }
}
