//! Request identity: the token that lets a server's response find its way
//! back to the client request that caused it.

use serde::{Deserialize, Serialize};

/// Identifies a logical client-side request so the matching response can be
/// routed back. Analogous to an RMW-layer `RmwRequestId`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct RequestHeader {
  pub writer_guid: [u8; 16],
  pub sequence_number: i64,
}

/// Monotonically increasing per client, per request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(pub i64);

impl SequenceNumber {
  pub const ZERO: SequenceNumber = SequenceNumber(0);

  pub fn next(self) -> SequenceNumber {
    SequenceNumber(self.0 + 1)
  }
}

impl std::fmt::Display for SequenceNumber {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
