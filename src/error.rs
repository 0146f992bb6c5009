//! Error taxonomy for the lifecycle and action cores.
//!
//! Mirrors the error codes in the external-interface contract: every
//! fallible operation returns a [`Result`], and a thread-local slot carries
//! the last diagnostic message so callers can inspect *why* without
//! threading a string through every return type.

use std::cell::RefCell;
use std::panic::Location;

/// Error codes surfaced across the API boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Unspecified internal error.
  #[error("error: {0}")]
  Error(String),

  /// Allocation failed; the partially-built object was rolled back.
  #[error("allocation failed")]
  BadAlloc,

  /// A programmer error: bad argument to an otherwise well-formed call.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// Double-initialization of a handle that is already ready.
  #[error("already initialized")]
  AlreadyInit,

  /// Operation attempted on a handle that was never initialized.
  #[error("not initialized")]
  NotInit,

  /// A `wait` call exceeded its timeout without any source becoming ready.
  #[error("timed out")]
  Timeout,

  /// A `take_*` call ran with nothing pending.
  #[error("no data available")]
  NoData,

  /// The requested capability is not supported by this implementation.
  #[error("unsupported")]
  Unsupported,

  /// The transition map has no edge for `(current_state, key)`.
  #[error("invalid transition")]
  InvalidTransition,

  /// The abstract bus reported a failure while sending or receiving.
  #[error("transport error: {0}")]
  TransportError(String),

  /// A message did not match the type support bound to the endpoint.
  #[error("type mismatch")]
  TypeMismatch,

  /// `register_state` called with an `id` that is already registered.
  #[error("state already registered")]
  AlreadyRegistered,

  /// `register_transition` referenced an origin state that isn't registered.
  #[error("unknown origin state")]
  UnknownOrigin,

  /// `register_transition` referenced a goal state that isn't registered.
  #[error("unknown goal state")]
  UnknownGoal,
}

pub type Result<T> = std::result::Result<T, Error>;

struct Diagnostic {
  message: String,
  location: String,
}

thread_local! {
  static LAST_ERROR: RefCell<Option<Diagnostic>> = const { RefCell::new(None) };
}

/// Record a diagnostic message against the thread-scoped error channel.
///
/// Called internally whenever a fallible operation is about to return an
/// `Err`. Not part of the public API: callers read the channel with
/// [`last_error_message`] and clear it with [`reset_error`].
#[track_caller]
pub(crate) fn record(message: impl Into<String>) {
  let location = Location::caller();
  LAST_ERROR.with(|slot| {
    *slot.borrow_mut() = Some(Diagnostic {
      message: message.into(),
      location: format!("{}:{}:{}", location.file(), location.line(), location.column()),
    });
  });
}

/// Read the last diagnostic message recorded on this thread, if any.
///
/// Returns `(message, "file:line:column")`. Successful calls never leave a
/// stale message behind; a caller who only checks return values can ignore
/// this entirely.
pub fn last_error_message() -> Option<(String, String)> {
  LAST_ERROR.with(|slot| {
    slot
      .borrow()
      .as_ref()
      .map(|d| (d.message.clone(), d.location.clone()))
  })
}

/// Clear the thread-scoped error channel.
pub fn reset_error() {
  LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}
