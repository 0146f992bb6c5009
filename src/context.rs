//! Process-wide entry point a [`crate::node::Node`] is created from.
//!
//! A real DDS-backed `Context` would wrap a `DomainParticipant`; since DDS
//! discovery is out of scope here, this `Context` wraps the in-process
//! [`Bus`] instead. Every `Node` built from the same `Context` shares the
//! same bus, so their endpoints can rendezvous.

use std::sync::Arc;

use crate::bus::Bus;
use crate::node::{Node, NodeOptions};

/// Shared handle to the process's message bus.
#[derive(Clone, Default)]
pub struct Context {
  bus: Arc<Bus>,
}

impl Context {
  pub fn new() -> Context {
    Context { bus: Arc::new(Bus::new()) }
  }

  pub fn bus(&self) -> &Bus {
    &self.bus
  }

  /// Create a [`Node`] bound to this context's bus.
  pub fn new_node(&self, name: impl Into<String>, options: NodeOptions) -> Node {
    Node::new(name.into(), options, self.clone())
  }
}
