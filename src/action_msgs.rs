//! `action_msgs` — the handful of message shapes shared by every action:
//! goal identity + acceptance stamp, goal status, and the cancel protocol.
//!
//! Field layout and the `GoalStatusEnum` wire values follow
//! `action_msgs/msg/GoalStatus.msg` in upstream ROS 2.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{builtin_interfaces::Time, unique_identifier_msgs::GoalId};

/// Identity plus acceptance timestamp of one goal.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GoalInfo {
  pub goal_id: GoalId,
  pub stamp: Time,
}

/// Status a goal can occupy, in its stable wire representation.
#[derive(Clone, Copy, Serialize_repr, Deserialize_repr, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GoalStatusEnum {
  #[default]
  Unknown = 0,
  Accepted = 1,
  Executing = 2,
  Canceling = 3,
  Succeeded = 4,
  Canceled = 5,
  Aborted = 6,
}

impl GoalStatusEnum {
  /// A goal is terminal once it can no longer change status.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      GoalStatusEnum::Succeeded | GoalStatusEnum::Canceled | GoalStatusEnum::Aborted
    )
  }
}

/// One entry of a [`GoalStatusArray`]: a goal's identity plus its current status.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GoalStatus {
  pub goal_info: GoalInfo,
  pub status: GoalStatusEnum,
}

/// Snapshot of every goal an action server currently knows about.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct GoalStatusArray {
  pub status_list: Vec<GoalStatus>,
}

/// Request to cancel one or more goals. A zero goal id and/or a zero stamp
/// widen the match; see [`cancel_request_matches`] for the exact rules.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CancelGoalRequest {
  pub goal_info: GoalInfo,
}

/// The subset of requested goals actually transitioned to `Canceling`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct CancelGoalResponse {
  pub goals_canceling: Vec<GoalInfo>,
}

/// Decide whether `candidate` (a goal's id + acceptance stamp) matches a
/// [`CancelGoalRequest`]:
///
/// - zero id, zero stamp: cancel every goal
/// - specific id, zero stamp: cancel only that goal
/// - zero id, specific stamp: cancel every goal accepted at or before the stamp
/// - specific id, specific stamp: cancel that goal, plus every goal accepted
///   at or before the stamp
pub fn cancel_request_matches(request: &CancelGoalRequest, candidate: &GoalInfo) -> bool {
  let want_uuid = request.goal_info.goal_id;
  let want_stamp = request.goal_info.stamp;

  match (want_uuid.is_zero(), want_stamp.is_zero()) {
    (true, true) => true, // cancel all
    (false, true) => candidate.goal_id == want_uuid,
    (true, false) => candidate.stamp <= want_stamp,
    (false, false) => candidate.goal_id == want_uuid || candidate.stamp <= want_stamp,
  }
}
