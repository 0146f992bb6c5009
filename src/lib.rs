//! Managed-node lifecycle state machine and action protocol coordination,
//! built on an abstract pub/sub bus instead of a concrete DDS transport.
//!
//! Two cores live side by side:
//!
//! - [`lifecycle`]: the managed-node state machine (`unconfigured` ->
//!   `inactive` -> `active` -> `finalized`, with the transition/error states
//!   in between), built from a [`lifecycle::TransitionMap`] and driven one
//!   trigger at a time by a [`lifecycle::StateMachine`].
//! - [`action`]: goal submission, cancellation, feedback and result
//!   retrieval between an [`action::ActionClient`] and [`action::ActionServer`],
//!   multiplexed with other endpoints through a [`waitset::WaitSet`].
//!
//! Both are built on [`bus::Bus`], an in-process stand-in for the DDS
//! transport a real ROS 2 client library would use.

pub mod action;
pub mod action_msgs;
pub mod builtin_interfaces;
pub mod bus;
pub mod clock;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod node;
pub mod qos;
pub mod service;
pub mod unique_identifier_msgs;
pub mod waitset;

pub use context::Context;
pub use error::{Error, Result};
pub use node::{Node, NodeOptions};
