//! The Wait-Set: a readiness multiplexer aggregating action clients and
//! servers into one blocking wait with timeout.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Per-endpoint entity counts the wait-set aggregates across everything
/// registered to it. Field names follow `rclrs`'s `WaitableNumEntities`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaitableNumEntities {
  pub num_subscriptions: usize,
  pub num_guard_conditions: usize,
  pub num_timers: usize,
  pub num_clients: usize,
  pub num_services: usize,
}

impl std::ops::Add for WaitableNumEntities {
  type Output = WaitableNumEntities;
  fn add(self, rhs: WaitableNumEntities) -> WaitableNumEntities {
    WaitableNumEntities {
      num_subscriptions: self.num_subscriptions + rhs.num_subscriptions,
      num_guard_conditions: self.num_guard_conditions + rhs.num_guard_conditions,
      num_timers: self.num_timers + rhs.num_timers,
      num_clients: self.num_clients + rhs.num_clients,
      num_services: self.num_services + rhs.num_services,
    }
  }
}

/// Readiness projection for one action server, as of the last `wait`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerReadiness {
  pub goal_request_ready: bool,
  pub cancel_request_ready: bool,
  pub result_request_ready: bool,
}

/// Readiness projection for one action client, as of the last `wait`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientReadiness {
  pub feedback_ready: bool,
  pub status_ready: bool,
  pub goal_response_ready: bool,
  pub cancel_response_ready: bool,
  pub result_response_ready: bool,
}

/// Implemented by [`crate::action::ActionServer`] so the wait-set can poll
/// it without depending on the concrete action type.
pub trait WaitableServer {
  fn num_entities(&self) -> WaitableNumEntities;
  fn readiness(&self) -> ServerReadiness;
  fn is_ready(&self) -> bool {
    let r = self.readiness();
    r.goal_request_ready || r.cancel_request_ready || r.result_request_ready
  }
}

/// Implemented by [`crate::action::ActionClient`] so the wait-set can poll
/// it without depending on the concrete action type.
pub trait WaitableClient {
  fn num_entities(&self) -> WaitableNumEntities;
  fn readiness(&self) -> ClientReadiness;
  fn is_ready(&self) -> bool {
    let r = self.readiness();
    r.feedback_ready || r.status_ready || r.goal_response_ready || r.cancel_response_ready || r.result_response_ready
  }
}

/// Aggregates readiness sources from multiple action endpoints into a
/// single blocking wait with timeout. Borrows the endpoints it is given for
/// the duration of one wait cycle.
#[derive(Default)]
pub struct WaitSet<'a> {
  servers: Vec<&'a dyn WaitableServer>,
  clients: Vec<&'a dyn WaitableClient>,
}

impl<'a> WaitSet<'a> {
  pub fn new() -> WaitSet<'a> {
    WaitSet { servers: Vec::new(), clients: Vec::new() }
  }

  /// Drop every previously-added endpoint. Re-adding across cycles is
  /// expected; there is no separate "remove one" operation.
  pub fn clear(&mut self) {
    self.servers.clear();
    self.clients.clear();
  }

  /// Register an action server's readiness sources. Returns the index it
  /// was stored at; most callers ignore it.
  pub fn add_action_server(&mut self, srv: &'a dyn WaitableServer) -> usize {
    self.servers.push(srv);
    self.servers.len() - 1
  }

  /// Register an action client's readiness sources. Returns
  /// `(subscription_index, client_index)`.
  pub fn add_action_client(&mut self, cli: &'a dyn WaitableClient) -> (usize, usize) {
    self.clients.push(cli);
    let idx = self.clients.len() - 1;
    (idx, idx)
  }

  /// The additive totals across everything currently registered.
  pub fn total_entities(&self) -> WaitableNumEntities {
    let mut total = WaitableNumEntities::default();
    for s in &self.servers {
      total = total + s.num_entities();
    }
    for c in &self.clients {
      total = total + c.num_entities();
    }
    total
  }

  /// Block until at least one registered source is ready, or `timeout_ns`
  /// elapses. Negative timeout blocks forever; zero polls once.
  ///
  /// There is no OS-level multiplexed wait beneath this abstract bus, so
  /// readiness is established by polling every registered source at a fine
  /// grain until one reports ready or the deadline passes — the in-process
  /// analogue of blocking on a real wait-set's file descriptors.
  pub fn wait(&self, timeout_ns: i64) -> Result<()> {
    let deadline = if timeout_ns < 0 {
      None
    } else {
      Some(Instant::now() + Duration::from_nanos(timeout_ns as u64))
    };

    loop {
      if self.servers.iter().any(|s| s.is_ready()) || self.clients.iter().any(|c| c.is_ready()) {
        return Ok(());
      }
      if timeout_ns == 0 {
        crate::error::record("wait-set: zero-timeout poll found nothing ready");
        return Err(Error::Timeout);
      }
      if let Some(d) = deadline {
        if Instant::now() >= d {
          crate::error::record(format!("wait-set: timed out after {timeout_ns}ns with nothing ready"));
          return Err(Error::Timeout);
        }
      }
      thread::sleep(Duration::from_micros(200));
    }
  }

  /// Project readiness onto `srv`'s individual booleans, one out-parameter
  /// per readiness source, the way the underlying C wait-set API reports
  /// readiness. This implementation re-polls `srv` rather than consulting
  /// state cached by `wait`.
  pub fn server_get_entities_ready(
    &self,
    srv: &dyn WaitableServer,
    goal_req_ready: &mut bool,
    cancel_req_ready: &mut bool,
    result_req_ready: &mut bool,
  ) {
    let r = srv.readiness();
    *goal_req_ready = r.goal_request_ready;
    *cancel_req_ready = r.cancel_request_ready;
    *result_req_ready = r.result_request_ready;
  }

  #[allow(clippy::too_many_arguments)]
  pub fn client_get_entities_ready(
    &self,
    cli: &dyn WaitableClient,
    feedback_ready: &mut bool,
    status_ready: &mut bool,
    goal_resp_ready: &mut bool,
    cancel_resp_ready: &mut bool,
    result_resp_ready: &mut bool,
  ) {
    let r = cli.readiness();
    *feedback_ready = r.feedback_ready;
    *status_ready = r.status_ready;
    *goal_resp_ready = r.goal_response_ready;
    *cancel_resp_ready = r.cancel_response_ready;
    *result_resp_ready = r.result_response_ready;
  }
}
