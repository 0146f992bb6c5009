//! Drives a [`TransitionMap`] one trigger at a time, tracking current state.

use super::state::{LifecycleState, StateId, Transition, TransitionKey, TransitionMap};
use crate::error::{Error, Result};

/// A managed node's lifecycle: a [`TransitionMap`] plus the state it
/// currently occupies.
pub struct StateMachine {
  map: TransitionMap,
  current: StateId,
}

impl StateMachine {
  pub fn new(map: TransitionMap, initial: StateId) -> StateMachine {
    StateMachine { map, current: initial }
  }

  pub fn current_state(&self) -> &LifecycleState {
    self
      .map
      .get_state(self.current)
      .expect("current state is always a registered state")
  }

  pub fn transition_map(&self) -> &TransitionMap {
    &self.map
  }

  /// Whether `key` has a registered edge out of the current state.
  pub fn is_valid_transition(&self, key: TransitionKey) -> bool {
    self.map.get_transition(self.current, key).is_some()
  }

  /// Every transition available from the current state, as `(key,
  /// Transition)` pairs in the order they were registered.
  pub fn available_transitions(&self) -> impl Iterator<Item = (TransitionKey, &Transition)> {
    self.map.transitions_from(self.current)
  }

  /// Fire `key` from the current state. On success, moves to the edge's
  /// goal state and returns the transition taken; the state is left
  /// unchanged if no such edge is registered.
  pub fn trigger(&mut self, key: TransitionKey) -> Result<Transition> {
    let transition = self.map.get_transition(self.current, key).cloned().ok_or_else(|| {
      crate::error::record(format!("no transition for key {key:?} from state {}", self.current));
      Error::InvalidTransition
    })?;
    self.current = transition.goal;
    Ok(transition)
  }
}
