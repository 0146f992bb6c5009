//! `Node`: the unit a managed lifecycle and its actions are built from.
//!
//! A full ROS-style `Node` also owns rosout/parameter-event writers and a
//! discovery `Spinner`; those depend on DDS discovery and are out of scope
//! here (see the crate's non-goals). What survives is the builder role:
//! `Node` is where `create_action_client`/`create_action_server` live, and
//! where a managed node's lifecycle state machine is attached.

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::{
  action::{bind_action_client, bind_action_server, ActionClient, ActionServer, ActionTypes},
  context::Context,
  lifecycle::{init_default_state_machine, StateMachine},
  qos::EndpointConfig,
};

/// Configuration of a [`Node`]. Builder-style; a full ROS-style node's
/// `NodeOptions` would also carry rosout/parameter-related flags, which have
/// no counterpart here, since this crate does not implement a rosout topic
/// or a parameter service.
#[must_use]
#[derive(Clone, Debug)]
pub struct NodeOptions {
  /// Whether a fresh [`Node`] starts with the default managed-node lifecycle
  /// state machine already attached.
  with_default_lifecycle: bool,
}

impl NodeOptions {
  pub fn new() -> NodeOptions {
    NodeOptions { with_default_lifecycle: true }
  }

  pub fn with_default_lifecycle(self, with_default_lifecycle: bool) -> NodeOptions {
    NodeOptions { with_default_lifecycle, ..self }
  }
}

impl Default for NodeOptions {
  fn default() -> Self {
    Self::new()
  }
}

/// One participant on the bus. Holds the name it was created with, the
/// [`Context`] (and thus [`crate::bus::Bus`]) it was built from, and,
/// unless opted out of, the managed-node lifecycle state machine described
/// in [`crate::lifecycle`].
pub struct Node {
  name: String,
  context: Context,
  lifecycle: Option<StateMachine>,
}

impl Node {
  pub(crate) fn new(name: String, options: NodeOptions, context: Context) -> Node {
    let lifecycle = if options.with_default_lifecycle {
      Some(init_default_state_machine().expect("the default lifecycle graph is always well-formed"))
    } else {
      None
    };
    Node { name, context, lifecycle }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn context(&self) -> &Context {
    &self.context
  }

  /// The node's managed-node lifecycle, if [`NodeOptions::with_default_lifecycle`]
  /// wasn't turned off.
  pub fn lifecycle(&self) -> Option<&StateMachine> {
    self.lifecycle.as_ref()
  }

  pub fn lifecycle_mut(&mut self) -> Option<&mut StateMachine> {
    self.lifecycle.as_mut()
  }

  /// Bind an [`ActionClient`] for `A` under this node's namespace, using the
  /// `<action_name>/_action/<endpoint>` topic/service naming convention.
  pub fn create_action_client<A: ActionTypes + 'static>(&self, action_name: &str, config: EndpointConfig) -> ActionClient<A> {
    bind_action_client(self.context.bus(), &self.qualify(action_name), config)
  }

  /// Bind an [`ActionServer`] for `A` under this node's namespace.
  pub fn create_action_server<A: ActionTypes + 'static>(&self, action_name: &str, config: EndpointConfig) -> ActionServer<A> {
    bind_action_server(self.context.bus(), &self.qualify(action_name), config)
  }

  fn qualify(&self, action_name: &str) -> String {
    format!("{}/{}", self.name, action_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fresh_node_starts_with_unconfigured_lifecycle_by_default() {
    let context = Context::new();
    let node = context.new_node("talker", NodeOptions::new());
    assert_eq!(node.lifecycle().unwrap().current_state().label, "unconfigured");
  }

  #[test]
  fn opting_out_of_the_default_lifecycle_leaves_it_unset() {
    let context = Context::new();
    let node = context.new_node("talker", NodeOptions::new().with_default_lifecycle(false));
    assert!(node.lifecycle().is_none());
  }

  #[test]
  fn action_names_are_qualified_by_node_name() {
    let context = Context::new();
    let node = context.new_node("turtle1", NodeOptions::new());
    assert_eq!(node.qualify("rotate_absolute"), "turtle1/rotate_absolute");
  }
}
