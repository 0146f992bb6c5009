//! Quality-of-service stand-ins and the endpoint configuration record.
//!
//! Real QoS negotiation (DDS reliability/durability/history policies) is out
//! of scope; [`QosPolicy`] only carries the one knob the in-memory bus
//! actually needs — how many unread messages a subscription buffers before
//! the oldest is dropped.

/// A minimal queuing policy for one bus endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QosPolicy {
  /// Number of unread messages retained. `0` means "unbounded".
  pub depth: usize,
}

impl QosPolicy {
  pub const KEEP_LAST_1: QosPolicy = QosPolicy { depth: 1 };
  pub const KEEP_LAST_10: QosPolicy = QosPolicy { depth: 10 };
  pub const UNBOUNDED: QosPolicy = QosPolicy { depth: 0 };
}

impl Default for QosPolicy {
  fn default() -> Self {
    QosPolicy::KEEP_LAST_10
  }
}

/// Generalizes the separate client-side/server-side QoS option structs a
/// DDS-backed action implementation would carry into a single config record
/// covering every queue an action client/server pair needs, plus how long a
/// completed goal's result is retained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
  pub qos_goal_service: QosPolicy,
  pub qos_result_service: QosPolicy,
  pub qos_cancel_service: QosPolicy,
  pub qos_feedback_topic: QosPolicy,
  pub qos_status_topic: QosPolicy,
  /// Nanoseconds an accepted goal's result is retained after completion
  /// before the server may discard it. `0` means "keep forever".
  pub result_timeout_ns: u64,
}

impl Default for EndpointConfig {
  fn default() -> Self {
    EndpointConfig {
      qos_goal_service: QosPolicy::KEEP_LAST_1,
      qos_result_service: QosPolicy::KEEP_LAST_1,
      qos_cancel_service: QosPolicy::KEEP_LAST_1,
      qos_feedback_topic: QosPolicy::KEEP_LAST_10,
      qos_status_topic: QosPolicy::KEEP_LAST_1,
      result_timeout_ns: 0,
    }
  }
}
