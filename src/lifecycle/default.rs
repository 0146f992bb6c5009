//! The canonical managed-node lifecycle graph: the state/transition table a
//! freshly constructed node starts with, so every node gets the same states
//! and edges without hand-wiring them one at a time.
//!
//! Built in three phases, same as the upstream default state machine does:
//! register primary states, register transition states, then wire the 25
//! edges between them. The initial state is `unconfigured`.

use super::state::*;
use super::state_machine::StateMachine;
use crate::error::Result;

/// Stable per-edge transition ids. Distinct from [`TransitionKey`]: `key`
/// selects which edge fires out of a state, `id` names the edge itself, so
/// `shutdown` fired from three different primary states produces three
/// different ids here.
pub mod transition_id {
  use super::TransitionId;

  pub const CONFIGURE: TransitionId = 1;
  pub const CLEANUP: TransitionId = 2;
  pub const ACTIVATE: TransitionId = 3;
  pub const DEACTIVATE: TransitionId = 4;
  pub const UNCONFIGURED_SHUTDOWN: TransitionId = 5;
  pub const INACTIVE_SHUTDOWN: TransitionId = 6;
  pub const ACTIVE_SHUTDOWN: TransitionId = 7;

  pub const ON_CONFIGURE_SUCCESS: TransitionId = 10;
  pub const ON_CONFIGURE_FAILURE: TransitionId = 11;
  pub const ON_CONFIGURE_ERROR: TransitionId = 12;

  pub const ON_CLEANUP_SUCCESS: TransitionId = 20;
  pub const ON_CLEANUP_FAILURE: TransitionId = 21;
  pub const ON_CLEANUP_ERROR: TransitionId = 22;

  pub const ON_ACTIVATE_SUCCESS: TransitionId = 30;
  pub const ON_ACTIVATE_FAILURE: TransitionId = 31;
  pub const ON_ACTIVATE_ERROR: TransitionId = 32;

  pub const ON_DEACTIVATE_SUCCESS: TransitionId = 40;
  pub const ON_DEACTIVATE_FAILURE: TransitionId = 41;
  pub const ON_DEACTIVATE_ERROR: TransitionId = 42;

  pub const ON_SHUTDOWN_SUCCESS: TransitionId = 50;
  pub const ON_SHUTDOWN_FAILURE: TransitionId = 51;
  pub const ON_SHUTDOWN_ERROR: TransitionId = 52;

  pub const ON_ERROR_SUCCESS: TransitionId = 60;
  pub const ON_ERROR_FAILURE: TransitionId = 61;
  pub const ON_ERROR_ERROR: TransitionId = 62;
}

fn register_primary_states(map: &mut TransitionMap) -> Result<()> {
  map.register_state(LifecycleState::new(PRIMARY_STATE_UNKNOWN, "unknown"))?;
  map.register_state(LifecycleState::new(PRIMARY_STATE_UNCONFIGURED, "unconfigured"))?;
  map.register_state(LifecycleState::new(PRIMARY_STATE_INACTIVE, "inactive"))?;
  map.register_state(LifecycleState::new(PRIMARY_STATE_ACTIVE, "active"))?;
  map.register_state(LifecycleState::new(PRIMARY_STATE_FINALIZED, "finalized"))?;
  Ok(())
}

fn register_transition_states(map: &mut TransitionMap) -> Result<()> {
  map.register_state(LifecycleState::new(TRANSITION_STATE_CONFIGURING, "configuring"))?;
  map.register_state(LifecycleState::new(TRANSITION_STATE_CLEANINGUP, "cleaningup"))?;
  map.register_state(LifecycleState::new(TRANSITION_STATE_SHUTTINGDOWN, "shuttingdown"))?;
  map.register_state(LifecycleState::new(TRANSITION_STATE_ACTIVATING, "activating"))?;
  map.register_state(LifecycleState::new(TRANSITION_STATE_DEACTIVATING, "deactivating"))?;
  map.register_state(LifecycleState::new(TRANSITION_STATE_ERRORPROCESSING, "errorprocessing"))?;
  Ok(())
}

fn register_transitions(map: &mut TransitionMap) -> Result<()> {
  use transition_id::*;

  let edge = |id, label: &str, start, goal| Transition { id, label: label.to_string(), start, goal };

  map.register_transition(
    TransitionKey::Configure,
    edge(CONFIGURE, "configure", PRIMARY_STATE_UNCONFIGURED, TRANSITION_STATE_CONFIGURING),
  )?;
  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_CONFIGURE_SUCCESS, "configuring_to_inactive", TRANSITION_STATE_CONFIGURING, PRIMARY_STATE_INACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_CONFIGURE_FAILURE, "configuring_to_unconfigured", TRANSITION_STATE_CONFIGURING, PRIMARY_STATE_UNCONFIGURED),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_CONFIGURE_ERROR, "configuring_to_errorprocessing", TRANSITION_STATE_CONFIGURING, TRANSITION_STATE_ERRORPROCESSING),
  )?;

  map.register_transition(
    TransitionKey::Cleanup,
    edge(CLEANUP, "cleanup", PRIMARY_STATE_INACTIVE, TRANSITION_STATE_CLEANINGUP),
  )?;
  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_CLEANUP_SUCCESS, "cleaningup_to_unconfigured", TRANSITION_STATE_CLEANINGUP, PRIMARY_STATE_UNCONFIGURED),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_CLEANUP_FAILURE, "cleaningup_to_inactive", TRANSITION_STATE_CLEANINGUP, PRIMARY_STATE_INACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_CLEANUP_ERROR, "cleaningup_to_errorprocessing", TRANSITION_STATE_CLEANINGUP, TRANSITION_STATE_ERRORPROCESSING),
  )?;

  map.register_transition(
    TransitionKey::Activate,
    edge(ACTIVATE, "activate", PRIMARY_STATE_INACTIVE, TRANSITION_STATE_ACTIVATING),
  )?;
  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_ACTIVATE_SUCCESS, "activating_to_active", TRANSITION_STATE_ACTIVATING, PRIMARY_STATE_ACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_ACTIVATE_FAILURE, "activating_to_inactive", TRANSITION_STATE_ACTIVATING, PRIMARY_STATE_INACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_ACTIVATE_ERROR, "activating_to_errorprocessing", TRANSITION_STATE_ACTIVATING, TRANSITION_STATE_ERRORPROCESSING),
  )?;

  map.register_transition(
    TransitionKey::Deactivate,
    edge(DEACTIVATE, "deactivate", PRIMARY_STATE_ACTIVE, TRANSITION_STATE_DEACTIVATING),
  )?;
  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_DEACTIVATE_SUCCESS, "deactivating_to_inactive", TRANSITION_STATE_DEACTIVATING, PRIMARY_STATE_INACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_DEACTIVATE_FAILURE, "deactivating_to_active", TRANSITION_STATE_DEACTIVATING, PRIMARY_STATE_ACTIVE),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_DEACTIVATE_ERROR, "deactivating_to_errorprocessing", TRANSITION_STATE_DEACTIVATING, TRANSITION_STATE_ERRORPROCESSING),
  )?;

  // `shutdown` is one key fired from three different primary states; each
  // origin gets its own transition id even though all three land on
  // `shuttingdown`.
  map.register_transition(
    TransitionKey::Shutdown,
    edge(UNCONFIGURED_SHUTDOWN, "unconfigured_to_shuttingdown", PRIMARY_STATE_UNCONFIGURED, TRANSITION_STATE_SHUTTINGDOWN),
  )?;
  map.register_transition(
    TransitionKey::Shutdown,
    edge(INACTIVE_SHUTDOWN, "inactive_to_shuttingdown", PRIMARY_STATE_INACTIVE, TRANSITION_STATE_SHUTTINGDOWN),
  )?;
  map.register_transition(
    TransitionKey::Shutdown,
    edge(ACTIVE_SHUTDOWN, "active_to_shuttingdown", PRIMARY_STATE_ACTIVE, TRANSITION_STATE_SHUTTINGDOWN),
  )?;

  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_SHUTDOWN_SUCCESS, "shuttingdown_to_finalized", TRANSITION_STATE_SHUTTINGDOWN, PRIMARY_STATE_FINALIZED),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_SHUTDOWN_FAILURE, "shuttingdown_to_finalized", TRANSITION_STATE_SHUTTINGDOWN, PRIMARY_STATE_FINALIZED),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_SHUTDOWN_ERROR, "shuttingdown_to_errorprocessing", TRANSITION_STATE_SHUTTINGDOWN, TRANSITION_STATE_ERRORPROCESSING),
  )?;

  map.register_transition(
    TransitionKey::CallbackSuccess,
    edge(ON_ERROR_SUCCESS, "errorprocessing_to_unconfigured", TRANSITION_STATE_ERRORPROCESSING, PRIMARY_STATE_UNCONFIGURED),
  )?;
  map.register_transition(
    TransitionKey::CallbackFailure,
    edge(ON_ERROR_FAILURE, "errorprocessing_to_finalized", TRANSITION_STATE_ERRORPROCESSING, PRIMARY_STATE_FINALIZED),
  )?;
  map.register_transition(
    TransitionKey::CallbackError,
    edge(ON_ERROR_ERROR, "errorprocessing_to_finalized", TRANSITION_STATE_ERRORPROCESSING, PRIMARY_STATE_FINALIZED),
  )?;

  Ok(())
}

/// Build the standard managed-node lifecycle: 5 primary states, 6 transition
/// states, 25 edges between them, starting in `unconfigured`.
pub fn init_default_state_machine() -> Result<StateMachine> {
  let mut map = TransitionMap::new();
  register_primary_states(&mut map)?;
  register_transition_states(&mut map)?;
  register_transitions(&mut map)?;
  Ok(StateMachine::new(map, PRIMARY_STATE_UNCONFIGURED))
}
