//! Exercises the action wire protocol end to end over the in-process bus:
//! goal submission, feedback, result retrieval, cancellation, and the
//! wait-set's readiness tracking.

use serde::{Deserialize, Serialize};

use lifecycle_action_core::action::{bind_action_client, bind_action_server, Action};
use lifecycle_action_core::bus::Bus;
use lifecycle_action_core::qos::EndpointConfig;
use lifecycle_action_core::waitset::{WaitableClient, WaitableServer, WaitSet};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct Goal {
  target: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct GoalResult {
  total: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
struct Feedback {
  progress: i64,
}

type CountUp = Action<Goal, GoalResult, Feedback>;

fn bind_pair(bus: &Bus, name: &str) -> (
  lifecycle_action_core::action::ActionClient<CountUp>,
  lifecycle_action_core::action::ActionServer<CountUp>,
) {
  let config = EndpointConfig::default();
  let client = bind_action_client::<CountUp>(bus, name, config);
  let server = bind_action_server::<CountUp>(bus, name, config);
  (client, server)
}

#[test]
fn happy_path_goal_is_sent_received_and_accepted() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  let (req_id, goal_id) = client.send_goal(Goal { target: 5 }).unwrap();

  let (server_req_id, request) = server.receive_goal().unwrap().expect("goal should have arrived");
  assert_eq!(request.goal_id, goal_id, "goal id must round-trip bytewise");
  assert_eq!(request.goal, Goal { target: 5 });

  server
    .send_goal_response(server_req_id, lifecycle_action_core::action::SendGoalResponse {
      accepted: true,
      stamp: lifecycle_action_core::builtin_interfaces::Time::ZERO,
    })
    .unwrap();

  let response = client.receive_goal_response(req_id).unwrap().expect("response should have arrived");
  assert!(response.accepted);
}

#[test]
fn a_response_broadcast_to_other_clients_is_not_mistaken_for_ones_own() {
  let bus = Bus::new();
  let config = EndpointConfig::default();
  let client_a = bind_action_client::<CountUp>(&bus, "count_up", config);
  let client_b = bind_action_client::<CountUp>(&bus, "count_up", config);
  let server = bind_action_server::<CountUp>(&bus, "count_up", config);

  // Both clients are freshly created, so each assigns sequence_number 0 to
  // its first goal; only writer_guid tells the two requests apart.
  let (req_id_a, goal_id_a) = client_a.send_goal(Goal { target: 1 }).unwrap();
  let (req_id_b, goal_id_b) = client_b.send_goal(Goal { target: 2 }).unwrap();
  assert_eq!(req_id_a.sequence_number, 0);
  assert_eq!(req_id_b.sequence_number, 0);
  assert_ne!(req_id_a.writer_guid, req_id_b.writer_guid);

  let (server_req_id_a, request_a) = server.receive_goal().unwrap().unwrap();
  assert_eq!(request_a.goal_id, goal_id_a);
  let (server_req_id_b, request_b) = server.receive_goal().unwrap().unwrap();
  assert_eq!(request_b.goal_id, goal_id_b);

  // Respond to b first: the response lands on both clients' subscriptions,
  // since they share one broadcast response topic.
  server
    .send_goal_response(server_req_id_b, lifecycle_action_core::action::SendGoalResponse {
      accepted: true,
      stamp: lifecycle_action_core::builtin_interfaces::Time::ZERO,
    })
    .unwrap();

  // client_a must not mistake client_b's response for its own, even though
  // the sequence numbers collide.
  assert_eq!(client_a.receive_goal_response(req_id_a).unwrap(), None);
  let response_b = client_b.receive_goal_response(req_id_b).unwrap().expect("b's own response should arrive");
  assert!(response_b.accepted);

  server
    .send_goal_response(server_req_id_a, lifecycle_action_core::action::SendGoalResponse {
      accepted: true,
      stamp: lifecycle_action_core::builtin_interfaces::Time::ZERO,
    })
    .unwrap();
  let response_a = client_a.receive_goal_response(req_id_a).unwrap().expect("a's own response should arrive");
  assert!(response_a.accepted);
}

#[test]
fn sequence_numbers_strictly_increase_across_goals() {
  let bus = Bus::new();
  let (client, _server) = bind_pair(&bus, "count_up");

  let (first, _) = client.send_goal(Goal { target: 1 }).unwrap();
  let (second, _) = client.send_goal(Goal { target: 2 }).unwrap();
  let (third, _) = client.send_goal(Goal { target: 3 }).unwrap();

  assert!(second.sequence_number > first.sequence_number);
  assert!(third.sequence_number > second.sequence_number);
}

#[test]
fn feedback_is_delivered_in_order_and_filtered_by_goal_id() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  let (_req_id, goal_id) = client.send_goal(Goal { target: 10 }).unwrap();
  let (_, _request) = server.receive_goal().unwrap().unwrap();

  server.send_feedback(goal_id, Feedback { progress: 1 }).unwrap();
  server.send_feedback(goal_id, Feedback { progress: 2 }).unwrap();
  server.send_feedback(goal_id, Feedback { progress: 3 }).unwrap();

  assert_eq!(client.receive_feedback(goal_id).unwrap(), Some(Feedback { progress: 1 }));
  assert_eq!(client.receive_feedback(goal_id).unwrap(), Some(Feedback { progress: 2 }));
  assert_eq!(client.receive_feedback(goal_id).unwrap(), Some(Feedback { progress: 3 }));
  assert_eq!(client.receive_feedback(goal_id).unwrap(), None);
}

#[test]
fn result_round_trips_through_request_response() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  let (_req_id, goal_id) = client.send_goal(Goal { target: 7 }).unwrap();
  server.receive_goal().unwrap().unwrap();

  let result_req_id = client.request_result(goal_id).unwrap();
  let (server_req_id, request) = server.receive_result_request().unwrap().expect("result request should have arrived");
  assert_eq!(request.goal_id, goal_id);

  server
    .send_result(server_req_id, lifecycle_action_core::action::GetResultResponse {
      status: lifecycle_action_core::action_msgs::GoalStatusEnum::Succeeded,
      result: GoalResult { total: 7 },
    })
    .unwrap();

  let (status, result) = client.receive_result(result_req_id).unwrap().expect("result should have arrived");
  assert_eq!(status, lifecycle_action_core::action_msgs::GoalStatusEnum::Succeeded);
  assert_eq!(result, GoalResult { total: 7 });
}

#[test]
fn cancel_request_round_trips_goal_info() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  let (_req_id, goal_id) = client.send_goal(Goal { target: 3 }).unwrap();
  server.receive_goal().unwrap().unwrap();

  let cancel_req_id = client.cancel_goal(goal_id).unwrap();
  let (server_cancel_req_id, request) = server.receive_cancel_request().unwrap().expect("cancel request should have arrived");
  assert_eq!(request.goal_info.goal_id, goal_id);
  assert!(request.goal_info.stamp.is_zero());

  server
    .send_cancel_response(server_cancel_req_id, lifecycle_action_core::action_msgs::CancelGoalResponse {
      goals_canceling: vec![request.goal_info.clone()],
    })
    .unwrap();

  let response = client.receive_cancel_response(cancel_req_id).unwrap().expect("cancel response should have arrived");
  assert_eq!(response.goals_canceling.len(), 1);
  assert_eq!(response.goals_canceling[0].goal_id, goal_id);
}

#[test]
fn wait_set_cleared_and_repopulated_with_the_same_endpoints_reports_the_same_readiness() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  client.send_goal(Goal { target: 1 }).unwrap();

  let mut wait_set = WaitSet::new();
  wait_set.add_action_server(&server);
  wait_set.add_action_client(&client);
  let before = (server.readiness(), client.readiness());
  assert!(before.0.goal_request_ready);

  wait_set.clear();
  wait_set.add_action_server(&server);
  wait_set.add_action_client(&client);
  let after = (server.readiness(), client.readiness());

  assert_eq!(before, after);
}

#[test]
fn wait_set_wait_returns_immediately_once_a_goal_is_pending() {
  let bus = Bus::new();
  let (client, server) = bind_pair(&bus, "count_up");

  client.send_goal(Goal { target: 1 }).unwrap();

  let mut wait_set = WaitSet::new();
  wait_set.add_action_server(&server);
  wait_set.wait(0).expect("a pending goal request should make the wait-set ready without blocking");
}

#[test]
fn wait_set_times_out_with_nothing_pending() {
  let bus = Bus::new();
  let (_client, server) = bind_pair(&bus, "count_up");

  let mut wait_set = WaitSet::new();
  wait_set.add_action_server(&server);
  let err = wait_set.wait(0).unwrap_err();
  assert_eq!(err, lifecycle_action_core::Error::Timeout);
}
