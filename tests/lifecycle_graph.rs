//! Exercises the full managed-node lifecycle graph: every registered edge,
//! every non-edge, and the two canonical multi-step paths.

use lifecycle_action_core::lifecycle::{
  init_default_state_machine, StateId, StateMachine, TransitionKey, PRIMARY_STATE_ACTIVE,
  PRIMARY_STATE_FINALIZED, PRIMARY_STATE_INACTIVE, PRIMARY_STATE_UNCONFIGURED, TRANSITION_STATE_ACTIVATING,
  TRANSITION_STATE_CLEANINGUP, TRANSITION_STATE_CONFIGURING, TRANSITION_STATE_DEACTIVATING,
  TRANSITION_STATE_ERRORPROCESSING, TRANSITION_STATE_SHUTTINGDOWN,
};
use test_case::test_case;

fn state_machine_at(state: StateId) -> StateMachine {
  let base = init_default_state_machine().unwrap();
  StateMachine::new(base.transition_map().clone(), state)
}

#[test]
fn default_state_machine_starts_unconfigured() {
  let sm = init_default_state_machine().unwrap();
  assert_eq!(sm.current_state().id, PRIMARY_STATE_UNCONFIGURED);
}

#[test_case(PRIMARY_STATE_UNCONFIGURED, TransitionKey::Configure, TRANSITION_STATE_CONFIGURING; "configure")]
#[test_case(TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackSuccess, PRIMARY_STATE_INACTIVE; "configuring to inactive")]
#[test_case(TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackFailure, PRIMARY_STATE_UNCONFIGURED; "configuring to unconfigured")]
#[test_case(TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackError, TRANSITION_STATE_ERRORPROCESSING; "configuring to errorprocessing")]
#[test_case(PRIMARY_STATE_INACTIVE, TransitionKey::Cleanup, TRANSITION_STATE_CLEANINGUP; "cleanup")]
#[test_case(TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackSuccess, PRIMARY_STATE_UNCONFIGURED; "cleaningup to unconfigured")]
#[test_case(TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackFailure, PRIMARY_STATE_INACTIVE; "cleaningup to inactive")]
#[test_case(TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackError, TRANSITION_STATE_ERRORPROCESSING; "cleaningup to errorprocessing")]
#[test_case(PRIMARY_STATE_INACTIVE, TransitionKey::Activate, TRANSITION_STATE_ACTIVATING; "activate")]
#[test_case(TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackSuccess, PRIMARY_STATE_ACTIVE; "activating to active")]
#[test_case(TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackFailure, PRIMARY_STATE_INACTIVE; "activating to inactive")]
#[test_case(TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackError, TRANSITION_STATE_ERRORPROCESSING; "activating to errorprocessing")]
#[test_case(PRIMARY_STATE_ACTIVE, TransitionKey::Deactivate, TRANSITION_STATE_DEACTIVATING; "deactivate")]
#[test_case(TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackSuccess, PRIMARY_STATE_INACTIVE; "deactivating to inactive")]
#[test_case(TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackFailure, PRIMARY_STATE_ACTIVE; "deactivating to active")]
#[test_case(TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackError, TRANSITION_STATE_ERRORPROCESSING; "deactivating to errorprocessing")]
#[test_case(PRIMARY_STATE_UNCONFIGURED, TransitionKey::Shutdown, TRANSITION_STATE_SHUTTINGDOWN; "unconfigured shutdown")]
#[test_case(PRIMARY_STATE_INACTIVE, TransitionKey::Shutdown, TRANSITION_STATE_SHUTTINGDOWN; "inactive shutdown")]
#[test_case(PRIMARY_STATE_ACTIVE, TransitionKey::Shutdown, TRANSITION_STATE_SHUTTINGDOWN; "active shutdown")]
#[test_case(TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackSuccess, PRIMARY_STATE_FINALIZED; "shuttingdown to finalized on success")]
#[test_case(TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackFailure, PRIMARY_STATE_FINALIZED; "shuttingdown to finalized on failure")]
#[test_case(TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackError, TRANSITION_STATE_ERRORPROCESSING; "shuttingdown to errorprocessing")]
#[test_case(TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackSuccess, PRIMARY_STATE_UNCONFIGURED; "errorprocessing to unconfigured")]
#[test_case(TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackFailure, PRIMARY_STATE_FINALIZED; "errorprocessing to finalized on failure")]
#[test_case(TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackError, PRIMARY_STATE_FINALIZED; "errorprocessing to finalized on error")]
fn registered_edge_moves_to_its_tabulated_goal(origin: StateId, key: TransitionKey, expected_goal: StateId) {
  let mut sm = state_machine_at(origin);
  let transition = sm.trigger(key).unwrap();
  assert_eq!(transition.goal, expected_goal);
  assert_eq!(sm.current_state().id, expected_goal);
}

const EDGES: &[(StateId, TransitionKey)] = &[
  (PRIMARY_STATE_UNCONFIGURED, TransitionKey::Configure),
  (TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_CONFIGURING, TransitionKey::CallbackError),
  (PRIMARY_STATE_INACTIVE, TransitionKey::Cleanup),
  (TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_CLEANINGUP, TransitionKey::CallbackError),
  (PRIMARY_STATE_INACTIVE, TransitionKey::Activate),
  (TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_ACTIVATING, TransitionKey::CallbackError),
  (PRIMARY_STATE_ACTIVE, TransitionKey::Deactivate),
  (TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_DEACTIVATING, TransitionKey::CallbackError),
  (PRIMARY_STATE_UNCONFIGURED, TransitionKey::Shutdown),
  (PRIMARY_STATE_INACTIVE, TransitionKey::Shutdown),
  (PRIMARY_STATE_ACTIVE, TransitionKey::Shutdown),
  (TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_SHUTTINGDOWN, TransitionKey::CallbackError),
  (TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackSuccess),
  (TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackFailure),
  (TRANSITION_STATE_ERRORPROCESSING, TransitionKey::CallbackError),
];

const ALL_KEYS: [TransitionKey; 8] = [
  TransitionKey::Configure,
  TransitionKey::Cleanup,
  TransitionKey::Activate,
  TransitionKey::Deactivate,
  TransitionKey::Shutdown,
  TransitionKey::CallbackSuccess,
  TransitionKey::CallbackFailure,
  TransitionKey::CallbackError,
];

const ALL_STATES: [StateId; 10] = [
  PRIMARY_STATE_UNCONFIGURED,
  PRIMARY_STATE_INACTIVE,
  PRIMARY_STATE_ACTIVE,
  PRIMARY_STATE_FINALIZED,
  TRANSITION_STATE_CONFIGURING,
  TRANSITION_STATE_CLEANINGUP,
  TRANSITION_STATE_SHUTTINGDOWN,
  TRANSITION_STATE_ACTIVATING,
  TRANSITION_STATE_DEACTIVATING,
  TRANSITION_STATE_ERRORPROCESSING,
];

#[test]
fn every_combination_outside_the_table_is_rejected_without_moving() {
  for &state in &ALL_STATES {
    for &key in &ALL_KEYS {
      if EDGES.contains(&(state, key)) {
        continue;
      }
      let mut sm = state_machine_at(state);
      let err = sm.trigger(key).unwrap_err();
      assert_eq!(err, lifecycle_action_core::Error::InvalidTransition);
      assert_eq!(sm.current_state().id, state, "state changed on a rejected trigger");
    }
  }
}

#[test]
fn exactly_twenty_five_edges_are_registered() {
  assert_eq!(EDGES.len(), 25);
}

#[test]
fn available_transitions_from_unconfigured_preserves_registration_order() {
  let sm = init_default_state_machine().unwrap();
  let keys: Vec<TransitionKey> = sm.available_transitions().map(|(key, _)| key).collect();
  assert_eq!(keys, vec![TransitionKey::Configure, TransitionKey::Shutdown]);
}

#[test]
fn happy_path_configure_activate_deactivate() {
  let mut sm = init_default_state_machine().unwrap();
  sm.trigger(TransitionKey::Configure).unwrap();
  sm.trigger(TransitionKey::CallbackSuccess).unwrap();
  assert_eq!(sm.current_state().id, PRIMARY_STATE_INACTIVE);

  sm.trigger(TransitionKey::Activate).unwrap();
  sm.trigger(TransitionKey::CallbackSuccess).unwrap();
  assert_eq!(sm.current_state().id, PRIMARY_STATE_ACTIVE);

  sm.trigger(TransitionKey::Deactivate).unwrap();
  sm.trigger(TransitionKey::CallbackSuccess).unwrap();
  assert_eq!(sm.current_state().id, PRIMARY_STATE_INACTIVE);
}

#[test]
fn a_rejected_trigger_leaves_a_diagnostic_on_the_error_channel() {
  use lifecycle_action_core::error::{last_error_message, reset_error};

  reset_error();
  let mut sm = state_machine_at(PRIMARY_STATE_UNCONFIGURED);
  sm.trigger(TransitionKey::Deactivate).unwrap_err();
  let (message, _location) = last_error_message().expect("a diagnostic should have been recorded");
  assert!(message.contains("Deactivate"));
  reset_error();
}

#[test]
fn error_loop_from_active_recovers_to_unconfigured() {
  let mut sm = state_machine_at(PRIMARY_STATE_ACTIVE);
  sm.trigger(TransitionKey::Deactivate).unwrap();
  sm.trigger(TransitionKey::CallbackError).unwrap();
  assert_eq!(sm.current_state().id, TRANSITION_STATE_ERRORPROCESSING);
  sm.trigger(TransitionKey::CallbackSuccess).unwrap();
  assert_eq!(sm.current_state().id, PRIMARY_STATE_UNCONFIGURED);

  let err = sm.trigger(TransitionKey::Deactivate).unwrap_err();
  assert_eq!(err, lifecycle_action_core::Error::InvalidTransition);
}
