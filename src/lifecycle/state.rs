//! Lifecycle state and transition identity: the vocabulary a [`TransitionMap`]
//! is built from.
//!
//! State and transition ids follow `lifecycle_msgs/msg/State.msg` and
//! `Transition.msg`: primary states and transition (intermediate) states
//! share one id space, and every edge between them has both a trigger key
//! and its own stable numeric id.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub type StateId = u8;
pub type TransitionId = u8;

pub const PRIMARY_STATE_UNKNOWN: StateId = 0;
pub const PRIMARY_STATE_UNCONFIGURED: StateId = 1;
pub const PRIMARY_STATE_INACTIVE: StateId = 2;
pub const PRIMARY_STATE_ACTIVE: StateId = 3;
pub const PRIMARY_STATE_FINALIZED: StateId = 4;

pub const TRANSITION_STATE_CONFIGURING: StateId = 10;
pub const TRANSITION_STATE_CLEANINGUP: StateId = 11;
pub const TRANSITION_STATE_SHUTTINGDOWN: StateId = 12;
pub const TRANSITION_STATE_ACTIVATING: StateId = 13;
pub const TRANSITION_STATE_DEACTIVATING: StateId = 14;
pub const TRANSITION_STATE_ERRORPROCESSING: StateId = 15;

/// One node of the lifecycle graph: a primary state (unconfigured, inactive,
/// active, finalized, plus the transient unknown state before anything is
/// registered) or a transition state (configuring, cleaningup, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleState {
  pub id: StateId,
  pub label: String,
}

impl LifecycleState {
  pub fn new(id: StateId, label: impl Into<String>) -> LifecycleState {
    LifecycleState { id, label: label.into() }
  }
}

/// The trigger vocabulary a caller drives a
/// [`crate::lifecycle::state_machine::StateMachine`] with.
///
/// `Configure`/`Cleanup`/`Activate`/`Deactivate`/`Shutdown` are externally
/// triggered from a primary state; `CallbackSuccess`/`CallbackFailure`/
/// `CallbackError` report the outcome of whatever callback ran while in a
/// transition state, and are the only keys valid from one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKey {
  Configure,
  Cleanup,
  Activate,
  Deactivate,
  Shutdown,
  CallbackSuccess,
  CallbackFailure,
  CallbackError,
}

/// One edge of the lifecycle graph: `key`, fired from `start`, lands on
/// `goal`. `id` and `label` are the edge's own stable identity, distinct from
/// the trigger key — `shutdown` fired from three different primary states
/// produces three different transitions, each with its own id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
  pub id: TransitionId,
  pub label: String,
  pub start: StateId,
  pub goal: StateId,
}

/// Registry of states and the transitions between them, keyed by
/// `(origin_state, TransitionKey)`. States must be registered before any
/// transition referencing them.
#[derive(Default, Clone)]
pub struct TransitionMap {
  states: HashMap<StateId, LifecycleState>,
  transitions: HashMap<(StateId, TransitionKey), Transition>,
  /// Per-origin-state edge order, in registration order. Kept separately
  /// from `transitions` because a `HashMap`'s iteration order carries no
  /// such guarantee.
  order: HashMap<StateId, Vec<TransitionKey>>,
}

impl TransitionMap {
  pub fn new() -> TransitionMap {
    TransitionMap::default()
  }

  /// Register a state. Each id may be registered exactly once.
  pub fn register_state(&mut self, state: LifecycleState) -> Result<()> {
    if self.states.contains_key(&state.id) {
      crate::error::record(format!("state id {} already registered", state.id));
      return Err(Error::AlreadyRegistered);
    }
    self.states.insert(state.id, state);
    Ok(())
  }

  /// Register a transition. Both `transition.start` and `transition.goal`
  /// must already be registered states.
  pub fn register_transition(&mut self, key: TransitionKey, transition: Transition) -> Result<()> {
    if !self.states.contains_key(&transition.start) {
      crate::error::record(format!("transition {} references unregistered origin state {}", transition.label, transition.start));
      return Err(Error::UnknownOrigin);
    }
    if !self.states.contains_key(&transition.goal) {
      crate::error::record(format!("transition {} references unregistered goal state {}", transition.label, transition.goal));
      return Err(Error::UnknownGoal);
    }
    let start = transition.start;
    if self.transitions.insert((start, key), transition).is_none() {
      self.order.entry(start).or_default().push(key);
    }
    Ok(())
  }

  pub fn get_state(&self, id: StateId) -> Option<&LifecycleState> {
    self.states.get(&id)
  }

  pub fn get_transition(&self, from: StateId, key: TransitionKey) -> Option<&Transition> {
    self.transitions.get(&(from, key))
  }

  /// Every transition registered out of `from`, as `(key, Transition)` pairs
  /// in registration order.
  pub fn transitions_from(&self, from: StateId) -> impl Iterator<Item = (TransitionKey, &Transition)> {
    self
      .order
      .get(&from)
      .into_iter()
      .flatten()
      .map(move |&key| (key, self.transitions.get(&(from, key)).expect("order and transitions stay in sync")))
  }
}
