//! Message body contract.
//!
//! Message bodies are opaque values the core only needs to move around and
//! compare; serializing them onto a wire is someone else's problem. `Message`
//! plays the role a DDS-bound payload trait would, minus the
//! (de)serialization bound, since there is no wire format to serialize to
//! here.
use std::fmt::Debug;

/// Marker bound for values that travel across action/service endpoints.
///
/// Implemented for any `Clone + Debug` type; there is nothing else to
/// implement, because the bus moves values directly rather than encoding
/// them.
pub trait Message: Clone + Debug {}

impl<T: Clone + Debug> Message for T {}
