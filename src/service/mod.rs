//! Request/response service plumbing shared by every action endpoint pair.

pub mod request_id;

pub use crate::bus::{Client, Server};
