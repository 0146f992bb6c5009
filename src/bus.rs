//! Abstract pub/sub and request/response bus.
//!
//! The underlying pub/sub transport is treated as an abstract message bus
//! with typed topics and request/response channels; nothing here pretends
//! to be a wire-level DDS implementation. This module is the in-process
//! stand-in for a real network transport — enough to make the wait-set/
//! client/server protocol actually runnable and testable.
//!
//! A [`Bus`] is a named registry of topics and service pairs, analogous to
//! the role a DDS `DomainParticipant` (reached via
//! [`crate::context::Context`]) would play: endpoints created against the
//! same bus and the same name rendezvous with each other.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{Stream, StreamExt};

use crate::error::{Error, Result};
use crate::qos::QosPolicy;
use crate::service::request_id::{RequestHeader, SequenceNumber};

fn bounded_capacity(qos: QosPolicy) -> usize {
  if qos.depth == 0 {
    // "unbounded" in spirit; a bounded channel still needs a concrete
    // capacity, so pick something generous.
    4096
  } else {
    qos.depth
  }
}

// ---------------------------------------------------------------------
// Topics (pub/sub)
// ---------------------------------------------------------------------

struct TopicInner<T> {
  senders: Mutex<Vec<async_channel::Sender<T>>>,
}

/// A named broadcast channel: any number of [`Publisher`]s, any number of
/// [`Subscription`]s, each subscription seeing every message published
/// after it was created.
pub struct Topic<T> {
  inner: Arc<TopicInner<T>>,
}

impl<T> Clone for Topic<T> {
  fn clone(&self) -> Self {
    Topic { inner: Arc::clone(&self.inner) }
  }
}

impl<T: Clone + Send + 'static> Topic<T> {
  pub fn new() -> Topic<T> {
    Topic {
      inner: Arc::new(TopicInner { senders: Mutex::new(Vec::new()) }),
    }
  }

  pub fn publisher(&self) -> Publisher<T> {
    Publisher { inner: Arc::clone(&self.inner) }
  }

  pub fn subscription(&self, qos: QosPolicy) -> Subscription<T> {
    let (tx, rx) = async_channel::bounded(bounded_capacity(qos));
    self.inner.senders.lock().unwrap().push(tx);
    Subscription { receiver: rx }
  }
}

impl<T: Clone + Send + 'static> Default for Topic<T> {
  fn default() -> Self {
    Topic::new()
  }
}

/// Write end of a [`Topic`].
pub struct Publisher<T> {
  inner: Arc<TopicInner<T>>,
}

impl<T: Clone> Publisher<T> {
  /// Publish to every subscription currently attached to the topic.
  ///
  /// A subscription whose queue is full loses the message, same as an
  /// unreliable DDS publisher overrunning a reader's history depth; a
  /// closed subscription is dropped from the registry.
  pub fn publish(&self, value: T) -> Result<()> {
    let mut senders = self.inner.senders.lock().unwrap();
    senders.retain(|s| !s.is_closed());
    for sender in senders.iter() {
      let _ = sender.try_send(value.clone());
    }
    Ok(())
  }
}

/// Read end of a [`Topic`].
pub struct Subscription<T> {
  receiver: async_channel::Receiver<T>,
}

impl<T> Subscription<T> {
  /// Non-blocking: `Ok(None)` when no message is pending.
  pub fn take(&self) -> Result<Option<T>> {
    match self.receiver.try_recv() {
      Ok(v) => Ok(Some(v)),
      Err(async_channel::TryRecvError::Empty) => Ok(None),
      Err(async_channel::TryRecvError::Closed) => {
        crate::error::record("topic closed: take() called with no remaining publisher");
        Err(Error::TransportError("topic closed".into()))
      }
    }
  }

  /// Whether at least one message is pending (used by the wait-set).
  pub fn is_ready(&self) -> bool {
    !self.receiver.is_empty()
  }

  pub async fn async_take(&self) -> Result<T> {
    self.receiver.recv().await.map_err(|_| {
      crate::error::record("topic closed: async_take() called with no remaining publisher");
      Error::TransportError("topic closed".into())
    })
  }

  pub fn async_stream(&self) -> impl Stream<Item = Result<T>> + '_ {
    self.receiver.clone().map(Ok)
  }
}

// ---------------------------------------------------------------------
// Service pairs (request/response)
// ---------------------------------------------------------------------

/// One request/response rendezvous point, shared by exactly one
/// [`Client`] and one [`Server`] bound to the same action/service name.
struct ServicePairInner<Req, Resp> {
  request_topic: Topic<(RequestHeader, Req)>,
  response_topic: Topic<(RequestHeader, Resp)>,
}

pub struct Client<Req, Resp> {
  request_pub: Publisher<(RequestHeader, Req)>,
  response_sub: Subscription<(RequestHeader, Resp)>,
  writer_guid: [u8; 16],
  next_sequence_number: std::sync::atomic::AtomicI64,
}

impl<Req: Clone + Send + 'static, Resp: Clone + Send + 'static> Client<Req, Resp> {
  /// Assign the next sequence number and publish the request, tagged with
  /// this client's identity so the server can echo a routable header back.
  /// The returned header is the full identity of this request — callers must
  /// match responses against it whole, not just its sequence number, since a
  /// sequence number is only unique per client, not across every client
  /// bound to the same action name.
  ///
  /// Takes `&self`, not `&mut self`: the sequence counter is an atomic, so a
  /// client can send requests without exclusive access.
  pub fn send_request(&self, request: Req) -> Result<RequestHeader> {
    let seq = SequenceNumber(self.next_sequence_number.fetch_add(1, std::sync::atomic::Ordering::SeqCst));
    let header = RequestHeader { writer_guid: self.writer_guid, sequence_number: seq.0 };
    self.request_pub.publish((header, request))?;
    Ok(header)
  }

  /// Pop the next pending response, if any. The core does not filter by
  /// request identity: callers compare the returned header against what
  /// `send_request` returned, as a whole struct.
  pub fn take_response(&self) -> Result<Option<(RequestHeader, Resp)>> {
    self.response_sub.take()
  }

  pub fn is_response_ready(&self) -> bool {
    self.response_sub.is_ready()
  }

  pub async fn async_call_service(&self, request: Req) -> Result<Resp> {
    let sent_header = self.send_request(request)?;
    loop {
      let (header, resp) = self.response_sub.async_take().await?;
      if header == sent_header {
        return Ok(resp);
      }
    }
  }
}

pub struct Server<Req, Resp> {
  request_sub: Subscription<(RequestHeader, Req)>,
  response_pub: Publisher<(RequestHeader, Resp)>,
}

impl<Req: Clone + Send + 'static, Resp: Clone + Send + 'static> Server<Req, Resp> {
  pub fn take_request(&self) -> Result<Option<(RequestHeader, Req)>> {
    self.request_sub.take()
  }

  pub fn is_request_ready(&self) -> bool {
    self.request_sub.is_ready()
  }

  /// `header` must be the one produced by the matching `take_request`, so
  /// the response routes back to its originating client.
  pub fn send_response(&self, header: RequestHeader, response: Resp) -> Result<()> {
    self.response_pub.publish((header, response))
  }

  pub async fn async_receive_request(&self) -> Result<(RequestHeader, Req)> {
    self.request_sub.async_take().await
  }
}

// ---------------------------------------------------------------------
// Bus: named registry binding clients and servers created independently
// ---------------------------------------------------------------------

trait AnySend: Any + Send {}
impl<T: Any + Send> AnySend for T {}

/// Registry of named topics and service pairs. Stands in for the DDS
/// `DomainParticipant` a real [`crate::context::Context`] would own.
#[derive(Default)]
pub struct Bus {
  topics: Mutex<HashMap<String, Box<dyn AnySend>>>,
  services: Mutex<HashMap<String, Box<dyn AnySend>>>,
}

impl fmt::Debug for Bus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Bus").finish_non_exhaustive()
  }
}

impl Bus {
  pub fn new() -> Bus {
    Bus::default()
  }

  fn topic_entry<T: Clone + Send + 'static>(&self, name: &str) -> Topic<T> {
    let mut topics = self.topics.lock().unwrap();
    let boxed = topics
      .entry(name.to_string())
      .or_insert_with(|| Box::new(Topic::<T>::new()));
    boxed
      .downcast_ref::<Topic<T>>()
      .expect("topic name reused with a different message type")
      .clone()
  }

  pub fn create_publisher<T: Clone + Send + 'static>(&self, topic_name: &str) -> Publisher<T> {
    self.topic_entry::<T>(topic_name).publisher()
  }

  pub fn create_subscription<T: Clone + Send + 'static>(
    &self,
    topic_name: &str,
    qos: QosPolicy,
  ) -> Subscription<T> {
    self.topic_entry::<T>(topic_name).subscription(qos)
  }

  fn service_entry<Req, Resp>(&self, name: &str) -> Arc<ServicePairInner<Req, Resp>>
  where
    Req: Clone + Send + 'static,
    Resp: Clone + Send + 'static,
  {
    let mut services = self.services.lock().unwrap();
    let boxed = services.entry(name.to_string()).or_insert_with(|| {
      Box::new(Arc::new(ServicePairInner {
        request_topic: Topic::new(),
        response_topic: Topic::new(),
      }))
    });
    Arc::clone(
      boxed
        .downcast_ref::<Arc<ServicePairInner<Req, Resp>>>()
        .expect("service name reused with a different request/response type"),
    )
  }

  /// `request_qos` governs how deep the server's view of this client's
  /// requests may buffer; `response_qos` governs this client's own inbox.
  pub fn create_client<Req, Resp>(
    &self,
    service_name: &str,
    request_qos: QosPolicy,
    response_qos: QosPolicy,
  ) -> Client<Req, Resp>
  where
    Req: Clone + Send + 'static,
    Resp: Clone + Send + 'static,
  {
    let pair = self.service_entry::<Req, Resp>(service_name);
    let _ = request_qos; // consumed on the server side's subscription
    Client {
      request_pub: pair.request_topic.publisher(),
      response_sub: pair.response_topic.subscription(response_qos),
      writer_guid: *uuid::Uuid::new_v4().as_bytes(),
      next_sequence_number: std::sync::atomic::AtomicI64::new(0),
    }
  }

  pub fn create_server<Req, Resp>(
    &self,
    service_name: &str,
    request_qos: QosPolicy,
    response_qos: QosPolicy,
  ) -> Server<Req, Resp>
  where
    Req: Clone + Send + 'static,
    Resp: Clone + Send + 'static,
  {
    let pair = self.service_entry::<Req, Resp>(service_name);
    let _ = response_qos; // consumed on the client side's subscription
    Server {
      request_sub: pair.request_topic.subscription(request_qos),
      response_pub: pair.response_topic.publisher(),
    }
  }
}
