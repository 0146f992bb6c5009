//! Action protocol: goal submission, cancellation, result retrieval and
//! feedback/status streaming, built on the abstract bus instead of DDS.
//!
//! `ActionClient`/`ActionServer` are raw wire plumbing: they know how to
//! send and take the five message shapes below, nothing about goal
//! lifecycle. `AsyncActionServer` adds goal bookkeeping on top of a plain
//! `ActionServer`.

use std::collections::BTreeMap;
use std::marker::PhantomData;

#[allow(unused_imports)]
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use futures::stream::{FusedStream, Stream, StreamExt};

use crate::{
  action_msgs::{self, CancelGoalRequest, CancelGoalResponse, GoalInfo, GoalStatus, GoalStatusArray, GoalStatusEnum},
  bus::{Bus, Client, Publisher, Server, Subscription},
  builtin_interfaces::Time,
  clock::Clock,
  error::{Error, Result},
  message::Message,
  qos::EndpointConfig,
  service::request_id::RequestHeader,
  unique_identifier_msgs::{self, GoalId},
  waitset::{ClientReadiness, ServerReadiness, WaitableClient, WaitableNumEntities, WaitableServer},
};

/// Binds the three payload types that make up one action: goal, result and
/// feedback. Implemented by [`Action`]; a user need not implement it by hand.
///
/// `Send + 'static` on every associated type is what lets [`bind_action_client`]
/// and [`bind_action_server`] register them on a [`Bus`], whose topics and
/// services are not scoped to a borrow.
pub trait ActionTypes {
  type GoalType: Message + Send + 'static;
  type ResultType: Message + Send + 'static;
  type FeedbackType: Message + Send + 'static;

  fn goal_type_name(&self) -> &str;
  fn result_type_name(&self) -> &str;
  fn feedback_type_name(&self) -> &str;
}

/// Constructs an [`ActionTypes`] implementation out of three concrete Rust
/// types plus the names they are known by on the wire.
pub struct Action<G, R, F> {
  g: PhantomData<G>,
  r: PhantomData<R>,
  f: PhantomData<F>,
  goal_typename: String,
  result_typename: String,
  feedback_typename: String,
}

impl<G: Message + Send + 'static, R: Message + Send + 'static, F: Message + Send + 'static> Action<G, R, F> {
  pub fn new(goal_typename: String, result_typename: String, feedback_typename: String) -> Self {
    Action {
      goal_typename,
      result_typename,
      feedback_typename,
      g: PhantomData,
      r: PhantomData,
      f: PhantomData,
    }
  }
}

impl<G: Message + Send + 'static, R: Message + Send + 'static, F: Message + Send + 'static> ActionTypes for Action<G, R, F> {
  type GoalType = G;
  type ResultType = R;
  type FeedbackType = F;

  fn goal_type_name(&self) -> &str {
    &self.goal_typename
  }
  fn result_type_name(&self) -> &str {
    &self.result_typename
  }
  fn feedback_type_name(&self) -> &str {
    &self.feedback_typename
  }
}

// ---------------------------------------------------------------------
// Wire message shapes (emulating what an IDL code generator would produce)
// ---------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SendGoalRequest<G> {
  pub goal_id: GoalId,
  pub goal: G,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SendGoalResponse {
  pub accepted: bool,
  pub stamp: Time,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GetResultRequest {
  pub goal_id: GoalId,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GetResultResponse<R> {
  pub status: GoalStatusEnum,
  pub result: R,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FeedbackMessage<F> {
  pub goal_id: GoalId,
  pub feedback: F,
}

// ---------------------------------------------------------------------
// ActionClient
// ---------------------------------------------------------------------

pub struct ActionClient<A>
where
  A: ActionTypes,
{
  my_goal_client: Client<SendGoalRequest<A::GoalType>, SendGoalResponse>,
  my_cancel_client: Client<CancelGoalRequest, CancelGoalResponse>,
  my_result_client: Client<GetResultRequest, GetResultResponse<A::ResultType>>,
  my_feedback_subscription: Subscription<FeedbackMessage<A::FeedbackType>>,
  my_status_subscription: Subscription<GoalStatusArray>,
  my_action_name: String,
}

/// Binds an [`ActionClient`] (or [`ActionServer`]) for `A` to a named
/// [`Bus`], using the `_action/<endpoint>` topic/service naming convention.
pub fn bind_action_client<A: ActionTypes + 'static>(
  bus: &Bus,
  action_name: &str,
  config: EndpointConfig,
) -> ActionClient<A> {
  let base = format!("{action_name}/_action");
  ActionClient {
    my_goal_client: bus.create_client(&format!("{base}/send_goal"), config.qos_goal_service, config.qos_goal_service),
    my_cancel_client: bus.create_client(&format!("{base}/cancel_goal"), config.qos_cancel_service, config.qos_cancel_service),
    my_result_client: bus.create_client(&format!("{base}/get_result"), config.qos_result_service, config.qos_result_service),
    my_feedback_subscription: bus.create_subscription(&format!("{base}/feedback"), config.qos_feedback_topic),
    my_status_subscription: bus.create_subscription(&format!("{base}/status"), config.qos_status_topic),
    my_action_name: action_name.to_string(),
  }
}

impl<A: ActionTypes> ActionClient<A> {
  pub fn name(&self) -> &str {
    &self.my_action_name
  }

  /// Submit a goal. Returns the request header (to recognize the matching
  /// response) and the goal id the server and client will both use from now
  /// on to refer to this goal.
  pub fn send_goal(&self, goal: A::GoalType) -> Result<(RequestHeader, GoalId)> {
    let goal_id = unique_identifier_msgs::UUID::new_random();
    let req_id = self.my_goal_client.send_request(SendGoalRequest { goal_id, goal })?;
    Ok((req_id, goal_id))
  }

  /// Non-blocking: `Ok(None)` if the response to `req_id` has not arrived
  /// yet. Responses for other requests are silently drained.
  pub fn receive_goal_response(&self, req_id: RequestHeader) -> Result<Option<SendGoalResponse>> {
    loop {
      match self.my_goal_client.take_response()? {
        None => return Ok(None),
        Some((header, resp)) if header == req_id => return Ok(Some(resp)),
        Some((header, _resp)) => {
          debug!("goal response not for us: {:?} != {:?}", header, req_id);
          continue;
        }
      }
    }
  }

  pub async fn async_send_goal(&self, goal: A::GoalType) -> Result<(GoalId, SendGoalResponse)> {
    let goal_id = unique_identifier_msgs::UUID::new_random();
    let resp = self
      .my_goal_client
      .async_call_service(SendGoalRequest { goal_id, goal })
      .await?;
    Ok((goal_id, resp))
  }

  // Cancel one or more goals, per action_msgs/srv/CancelGoal.srv:
  // - zero id, zero stamp: cancel all goals.
  // - zero id, non-zero stamp: cancel all goals accepted at or before stamp.
  // - specific id, zero stamp: cancel that goal regardless of its stamp.
  // - specific id, non-zero stamp: cancel that goal, plus all goals accepted
  //   at or before stamp.
  fn cancel_goal_raw(&self, goal_id: GoalId, stamp: Time) -> Result<RequestHeader> {
    self
      .my_cancel_client
      .send_request(CancelGoalRequest { goal_info: GoalInfo { goal_id, stamp } })
  }

  pub fn cancel_goal(&self, goal_id: GoalId) -> Result<RequestHeader> {
    self.cancel_goal_raw(goal_id, Time::ZERO)
  }

  pub fn cancel_all_goals_before(&self, stamp: Time) -> Result<RequestHeader> {
    self.cancel_goal_raw(GoalId::ZERO, stamp)
  }

  pub fn cancel_all_goals(&self) -> Result<RequestHeader> {
    self.cancel_goal_raw(GoalId::ZERO, Time::ZERO)
  }

  pub fn receive_cancel_response(&self, req_id: RequestHeader) -> Result<Option<CancelGoalResponse>> {
    loop {
      match self.my_cancel_client.take_response()? {
        None => return Ok(None),
        Some((header, resp)) if header == req_id => return Ok(Some(resp)),
        Some(_) => continue,
      }
    }
  }

  pub async fn async_cancel_goal(&self, goal_id: GoalId, stamp: Time) -> Result<CancelGoalResponse> {
    self
      .my_cancel_client
      .async_call_service(CancelGoalRequest { goal_info: GoalInfo { goal_id, stamp } })
      .await
  }

  pub fn request_result(&self, goal_id: GoalId) -> Result<RequestHeader> {
    self.my_result_client.send_request(GetResultRequest { goal_id })
  }

  pub fn receive_result(&self, req_id: RequestHeader) -> Result<Option<(GoalStatusEnum, A::ResultType)>> {
    loop {
      match self.my_result_client.take_response()? {
        None => return Ok(None),
        Some((header, GetResultResponse { status, result })) if header == req_id => {
          return Ok(Some((status, result)))
        }
        Some(_) => continue,
      }
    }
  }

  /// Request should be sent as soon as a goal is accepted; it only resolves
  /// once the server reports the goal has reached a terminal status.
  pub async fn async_request_result(&self, goal_id: GoalId) -> Result<(GoalStatusEnum, A::ResultType)> {
    let GetResultResponse { status, result } = self
      .my_result_client
      .async_call_service(GetResultRequest { goal_id })
      .await?;
    Ok((status, result))
  }

  pub fn receive_feedback(&self, goal_id: GoalId) -> Result<Option<A::FeedbackType>> {
    loop {
      match self.my_feedback_subscription.take()? {
        None => return Ok(None),
        Some(FeedbackMessage { goal_id: fb_id, feedback }) if fb_id == goal_id => return Ok(Some(feedback)),
        Some(FeedbackMessage { goal_id: fb_id, .. }) => {
          debug!("feedback on another goal {:?} != {:?}", fb_id, goal_id);
        }
      }
    }
  }

  pub fn feedback_stream(&self, goal_id: GoalId) -> impl Stream<Item = Result<A::FeedbackType>> + FusedStream + '_ {
    self
      .my_feedback_subscription
      .async_stream()
      .filter_map(move |result| async move {
        match result {
          Err(e) => Some(Err(e)),
          Ok(FeedbackMessage { goal_id: fb_id, feedback }) if fb_id == goal_id => Some(Ok(feedback)),
          Ok(_) => None,
        }
      })
      .fuse()
  }

  /// Reports status of every goal known to the server, not just one.
  pub fn receive_status(&self) -> Result<Option<GoalStatusArray>> {
    self.my_status_subscription.take()
  }

  pub async fn async_receive_status(&self) -> Result<GoalStatusArray> {
    self.my_status_subscription.async_take().await
  }

  pub fn all_statuses_stream(&self) -> impl Stream<Item = Result<GoalStatusArray>> + FusedStream + '_ {
    self.my_status_subscription.async_stream().fuse()
  }

  pub fn status_stream(&self, goal_id: GoalId) -> impl Stream<Item = Result<GoalStatus>> + FusedStream + '_ {
    self.all_statuses_stream().filter_map(move |result| async move {
      match result {
        Err(e) => Some(Err(e)),
        Ok(gsa) => gsa.status_list.into_iter().find(|gs| gs.goal_info.goal_id == goal_id).map(Ok),
      }
    })
  }
}

impl<A: ActionTypes> WaitableClient for ActionClient<A> {
  fn num_entities(&self) -> WaitableNumEntities {
    WaitableNumEntities { num_subscriptions: 2, num_clients: 3, ..Default::default() }
  }

  fn readiness(&self) -> ClientReadiness {
    ClientReadiness {
      feedback_ready: self.my_feedback_subscription.is_ready(),
      status_ready: self.my_status_subscription.is_ready(),
      goal_response_ready: self.my_goal_client.is_response_ready(),
      cancel_response_ready: self.my_cancel_client.is_response_ready(),
      result_response_ready: self.my_result_client.is_response_ready(),
    }
  }
}

// ---------------------------------------------------------------------
// ActionServer: raw plumbing only, no goal bookkeeping
// ---------------------------------------------------------------------

pub struct ActionServer<A>
where
  A: ActionTypes,
{
  my_goal_server: Server<SendGoalRequest<A::GoalType>, SendGoalResponse>,
  my_cancel_server: Server<CancelGoalRequest, CancelGoalResponse>,
  my_result_server: Server<GetResultRequest, GetResultResponse<A::ResultType>>,
  my_feedback_publisher: Publisher<FeedbackMessage<A::FeedbackType>>,
  my_status_publisher: Publisher<GoalStatusArray>,
  my_action_name: String,
}

pub fn bind_action_server<A: ActionTypes + 'static>(
  bus: &Bus,
  action_name: &str,
  config: EndpointConfig,
) -> ActionServer<A> {
  let base = format!("{action_name}/_action");
  ActionServer {
    my_goal_server: bus.create_server(&format!("{base}/send_goal"), config.qos_goal_service, config.qos_goal_service),
    my_cancel_server: bus.create_server(&format!("{base}/cancel_goal"), config.qos_cancel_service, config.qos_cancel_service),
    my_result_server: bus.create_server(&format!("{base}/get_result"), config.qos_result_service, config.qos_result_service),
    my_feedback_publisher: bus.create_publisher(&format!("{base}/feedback")),
    my_status_publisher: bus.create_publisher(&format!("{base}/status")),
    my_action_name: action_name.to_string(),
  }
}

impl<A: ActionTypes> ActionServer<A> {
  pub fn name(&self) -> &str {
    &self.my_action_name
  }

  pub fn receive_goal(&self) -> Result<Option<(RequestHeader, SendGoalRequest<A::GoalType>)>> {
    self.my_goal_server.take_request()
  }

  pub fn send_goal_response(&self, req_id: RequestHeader, resp: SendGoalResponse) -> Result<()> {
    self.my_goal_server.send_response(req_id, resp)
  }

  pub fn receive_cancel_request(&self) -> Result<Option<(RequestHeader, CancelGoalRequest)>> {
    self.my_cancel_server.take_request()
  }

  pub fn send_cancel_response(&self, req_id: RequestHeader, resp: CancelGoalResponse) -> Result<()> {
    self.my_cancel_server.send_response(req_id, resp)
  }

  pub fn receive_result_request(&self) -> Result<Option<(RequestHeader, GetResultRequest)>> {
    self.my_result_server.take_request()
  }

  pub fn send_result(&self, req_id: RequestHeader, resp: GetResultResponse<A::ResultType>) -> Result<()> {
    self.my_result_server.send_response(req_id, resp)
  }

  pub fn send_feedback(&self, goal_id: GoalId, feedback: A::FeedbackType) -> Result<()> {
    self.my_feedback_publisher.publish(FeedbackMessage { goal_id, feedback })
  }

  pub fn send_goal_statuses(&self, goal_statuses: GoalStatusArray) -> Result<()> {
    self.my_status_publisher.publish(goal_statuses)
  }
}

impl<A: ActionTypes> WaitableServer for ActionServer<A> {
  fn num_entities(&self) -> WaitableNumEntities {
    WaitableNumEntities { num_services: 3, ..Default::default() }
  }

  fn readiness(&self) -> ServerReadiness {
    ServerReadiness {
      goal_request_ready: self.my_goal_server.is_request_ready(),
      cancel_request_ready: self.my_cancel_server.is_request_ready(),
      result_request_ready: self.my_result_server.is_request_ready(),
    }
  }
}

// ---------------------------------------------------------------------
// Typestate goal handles
// ---------------------------------------------------------------------

struct InnerGoalHandle<G> {
  goal_id: GoalId,
  phantom: PhantomData<G>,
}

pub struct NewGoalHandle<G> {
  inner: InnerGoalHandle<G>,
  req_id: RequestHeader,
}

impl<G> NewGoalHandle<G> {
  pub fn goal_id(&self) -> GoalId {
    self.inner.goal_id
  }
}

pub struct AcceptedGoalHandle<G> {
  inner: InnerGoalHandle<G>,
}

impl<G> AcceptedGoalHandle<G> {
  pub fn goal_id(&self) -> GoalId {
    self.inner.goal_id
  }
}

pub struct ExecutingGoalHandle<G> {
  inner: InnerGoalHandle<G>,
}

impl<G> ExecutingGoalHandle<G> {
  pub fn goal_id(&self) -> GoalId {
    self.inner.goal_id
  }
}

pub struct CancelingGoalHandle<G> {
  inner: InnerGoalHandle<G>,
}

impl<G> CancelingGoalHandle<G> {
  pub fn goal_id(&self) -> GoalId {
    self.inner.goal_id
  }
}

#[derive(thiserror::Error, Debug)]
pub enum GoalError {
  #[error("no such goal")]
  NoSuchGoal,
  #[error("goal is not in the expected state")]
  WrongGoalState,
  #[error(transparent)]
  Core(#[from] Error),
}

// ---------------------------------------------------------------------
// AsyncActionServer: goal bookkeeping on top of a raw ActionServer
// ---------------------------------------------------------------------

struct GoalRecord<G, R> {
  status: GoalStatusEnum,
  goal: G,
  stamp: Time,
  result: Option<(GoalStatusEnum, R)>,
}

impl<G, R> GoalRecord<G, R> {
  fn info(&self, goal_id: GoalId) -> GoalInfo {
    GoalInfo { goal_id, stamp: self.stamp }
  }
}

/// Tracks every goal an [`ActionServer`] currently knows about and answers
/// result requests once a goal reaches a terminal status. Status is
/// published automatically on every change, never manually.
pub struct AsyncActionServer<A>
where
  A: ActionTypes,
{
  action_server: ActionServer<A>,
  clock: Box<dyn Clock>,
  result_timeout_ns: u64,
  goals: BTreeMap<GoalId, GoalRecord<A::GoalType, A::ResultType>>,
  pending_cancel: Option<RequestHeader>,
  pending_result_requests: BTreeMap<GoalId, RequestHeader>,
}

impl<A: ActionTypes> AsyncActionServer<A> {
  pub fn new(action_server: ActionServer<A>, clock: Box<dyn Clock>, config: &EndpointConfig) -> Self {
    AsyncActionServer {
      action_server,
      clock,
      result_timeout_ns: config.result_timeout_ns,
      goals: BTreeMap::new(),
      pending_cancel: None,
      pending_result_requests: BTreeMap::new(),
    }
  }

  pub fn inner(&self) -> &ActionServer<A> {
    &self.action_server
  }

  fn status_snapshot(&self) -> GoalStatusArray {
    GoalStatusArray {
      status_list: self
        .goals
        .iter()
        .map(|(id, rec)| GoalStatus { goal_info: rec.info(*id), status: rec.status })
        .collect(),
    }
  }

  fn publish_statuses(&self) -> Result<()> {
    self.action_server.send_goal_statuses(self.status_snapshot())
  }

  /// Receive a new goal from a client. The server must immediately accept or
  /// reject it with [`accept_goal`](Self::accept_goal)/[`reject_goal`](Self::reject_goal).
  pub async fn receive_new_goal(&mut self) -> Result<NewGoalHandle<A::GoalType>> {
    loop {
      let (req_id, request) = self.action_server.my_goal_server.async_receive_request().await?;
      if self.goals.contains_key(&request.goal_id) {
        error!("received duplicate goal_id {:?}, req_id={:?}", request.goal_id, req_id);
        continue;
      }
      self.goals.insert(
        request.goal_id,
        GoalRecord { status: GoalStatusEnum::Unknown, goal: request.goal, stamp: Time::ZERO, result: None },
      );
      return Ok(NewGoalHandle {
        inner: InnerGoalHandle { goal_id: request.goal_id, phantom: PhantomData },
        req_id,
      });
    }
  }

  /// Accept a newly received goal for later execution. Notifies the client.
  pub fn accept_goal(&mut self, handle: NewGoalHandle<A::GoalType>) -> std::result::Result<AcceptedGoalHandle<A::GoalType>, GoalError> {
    let goal_id = handle.inner.goal_id;
    let rec = self.goals.get_mut(&goal_id).ok_or(GoalError::NoSuchGoal)?;
    if rec.status != GoalStatusEnum::Unknown {
      error!("tried to accept goal {:?} but status was {:?}", goal_id, rec.status);
      return Err(GoalError::WrongGoalState);
    }
    let stamp = self.clock.now();
    rec.status = GoalStatusEnum::Accepted;
    rec.stamp = stamp;
    self
      .action_server
      .send_goal_response(handle.req_id, SendGoalResponse { accepted: true, stamp })?;
    self.publish_statuses()?;
    Ok(AcceptedGoalHandle { inner: handle.inner })
  }

  /// Reject a newly received goal. Notifies the client; no status is ever
  /// published for a rejected goal, since it never occupied one.
  pub fn reject_goal(&mut self, handle: NewGoalHandle<A::GoalType>) -> std::result::Result<(), GoalError> {
    let goal_id = handle.inner.goal_id;
    let rec = self.goals.get(&goal_id).ok_or(GoalError::NoSuchGoal)?;
    if rec.status != GoalStatusEnum::Unknown {
      error!("tried to reject goal {:?} but status was {:?}", goal_id, rec.status);
      return Err(GoalError::WrongGoalState);
    }
    self.goals.remove(&goal_id);
    self
      .action_server
      .send_goal_response(handle.req_id, SendGoalResponse { accepted: false, stamp: self.clock.now() })?;
    Ok(())
  }

  pub fn start_executing_goal(&mut self, handle: AcceptedGoalHandle<A::GoalType>) -> std::result::Result<ExecutingGoalHandle<A::GoalType>, GoalError> {
    let goal_id = handle.inner.goal_id;
    let rec = self.goals.get_mut(&goal_id).ok_or(GoalError::NoSuchGoal)?;
    if rec.status != GoalStatusEnum::Accepted {
      return Err(GoalError::WrongGoalState);
    }
    rec.status = GoalStatusEnum::Executing;
    self.publish_statuses()?;
    Ok(ExecutingGoalHandle { inner: handle.inner })
  }

  pub fn publish_feedback(&self, handle: &ExecutingGoalHandle<A::GoalType>, feedback: A::FeedbackType) -> std::result::Result<(), GoalError> {
    self.action_server.send_feedback(handle.inner.goal_id, feedback)?;
    Ok(())
  }

  fn complete_goal(&mut self, goal_id: GoalId, status: GoalStatusEnum, result: A::ResultType) -> std::result::Result<(), GoalError> {
    let rec = self.goals.get_mut(&goal_id).ok_or(GoalError::NoSuchGoal)?;
    rec.status = status;
    rec.result = Some((status, result.clone()));
    self.publish_statuses()?;
    if let Some(req_id) = self.pending_result_requests.remove(&goal_id) {
      self.action_server.send_result(req_id, GetResultResponse { status, result })?;
    }
    Ok(())
  }

  pub fn succeed_goal(&mut self, handle: ExecutingGoalHandle<A::GoalType>, result: A::ResultType) -> std::result::Result<(), GoalError> {
    self.complete_goal(handle.inner.goal_id, GoalStatusEnum::Succeeded, result)
  }

  pub fn abort_executing_goal(&mut self, handle: ExecutingGoalHandle<A::GoalType>, result: A::ResultType) -> std::result::Result<(), GoalError> {
    self.complete_goal(handle.inner.goal_id, GoalStatusEnum::Aborted, result)
  }

  pub fn abort_accepted_goal(&mut self, handle: AcceptedGoalHandle<A::GoalType>, result: A::ResultType) -> std::result::Result<(), GoalError> {
    self.complete_goal(handle.inner.goal_id, GoalStatusEnum::Aborted, result)
  }

  /// Receive a pending cancel request and return the ids of currently
  /// non-terminal goals it would cancel, per the zero-id/zero-stamp matching
  /// policy. The caller decides which of these, if any, to actually cancel
  /// and replies with [`respond_to_cancel_requests`](Self::respond_to_cancel_requests).
  pub async fn receive_cancel_request(&mut self) -> Result<Vec<GoalId>> {
    let (req_id, request) = self.action_server.my_cancel_server.async_receive_request().await?;
    let mut candidates = Vec::new();
    for (&goal_id, rec) in self.goals.iter() {
      if !rec.status.is_terminal() && action_msgs::cancel_request_matches(&request, &rec.info(goal_id)) {
        candidates.push(goal_id);
      }
    }
    self.pending_cancel = Some(req_id);
    Ok(candidates)
  }

  /// Transition every goal in `goals` to `Canceling` and answer the pending
  /// cancel request with the subset actually transitioned.
  pub fn respond_to_cancel_requests(&mut self, goals: impl IntoIterator<Item = GoalId>) -> Result<()> {
    let req_id = self.pending_cancel.take().ok_or_else(|| {
      crate::error::record("respond_to_cancel_requests called with no pending cancel request");
      Error::InvalidArgument("no pending cancel request to respond to".into())
    })?;
    let mut goals_canceling = Vec::new();
    for goal_id in goals {
      if let Some(rec) = self.goals.get_mut(&goal_id) {
        if !rec.status.is_terminal() {
          rec.status = GoalStatusEnum::Canceling;
          goals_canceling.push(rec.info(goal_id));
        }
      }
    }
    self.action_server.send_cancel_response(req_id, CancelGoalResponse { goals_canceling })?;
    self.publish_statuses()
  }

  pub fn cancel_goal(&mut self, handle: ExecutingGoalHandle<A::GoalType>) -> std::result::Result<CancelingGoalHandle<A::GoalType>, GoalError> {
    let goal_id = handle.inner.goal_id;
    let rec = self.goals.get_mut(&goal_id).ok_or(GoalError::NoSuchGoal)?;
    rec.status = GoalStatusEnum::Canceling;
    self.publish_statuses()?;
    Ok(CancelingGoalHandle { inner: handle.inner })
  }

  pub fn confirm_goal_canceled(&mut self, handle: CancelingGoalHandle<A::GoalType>, result: A::ResultType) -> std::result::Result<(), GoalError> {
    self.complete_goal(handle.inner.goal_id, GoalStatusEnum::Canceled, result)
  }

  /// Drain and answer pending result requests: immediately for goals already
  /// terminal, parked for later otherwise.
  pub fn service_result_requests(&mut self) -> Result<()> {
    while let Some((req_id, request)) = self.action_server.receive_result_request()? {
      match self.goals.get(&request.goal_id).and_then(|rec| rec.result.clone()) {
        Some((status, result)) => self.action_server.send_result(req_id, GetResultResponse { status, result })?,
        None => {
          self.pending_result_requests.insert(request.goal_id, req_id);
        }
      }
    }
    Ok(())
  }

  /// Discard completed goals whose result has outlived `result_timeout_ns`.
  /// A timeout of `0` means results are kept forever.
  pub fn expire_results(&mut self) {
    if self.result_timeout_ns == 0 {
      return;
    }
    let now = self.clock.now();
    let timeout_ns = self.result_timeout_ns;
    self.goals.retain(|_, rec| {
      if rec.result.is_none() {
        return true;
      }
      now.saturating_nanos_since(&rec.stamp) < timeout_ns
    });
  }
}
