//! Managed-node lifecycle: the state graph a node moves through (configure,
//! activate, deactivate, cleanup, shutdown) and the primitives used to build
//! and drive it.

pub mod default;
pub mod state;
pub mod state_machine;

pub use default::{init_default_state_machine, transition_id};
pub use state::{
  LifecycleState, StateId, Transition, TransitionId, TransitionKey, TransitionMap,
  PRIMARY_STATE_ACTIVE, PRIMARY_STATE_FINALIZED, PRIMARY_STATE_INACTIVE, PRIMARY_STATE_UNCONFIGURED,
  PRIMARY_STATE_UNKNOWN, TRANSITION_STATE_ACTIVATING, TRANSITION_STATE_CLEANINGUP,
  TRANSITION_STATE_CONFIGURING, TRANSITION_STATE_DEACTIVATING, TRANSITION_STATE_ERRORPROCESSING,
  TRANSITION_STATE_SHUTTINGDOWN,
};
pub use state_machine::StateMachine;
