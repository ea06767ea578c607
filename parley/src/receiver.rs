//! The receiver collaborator interface.
//!
//! A receiver owns the transport: listening, TLS, raw body parsing,
//! signature verification, and the no-ack send-side timeout. This core
//! consumes decoded events from it as [`IncomingEvent`] tuples and hands
//! the receiver an [`EventSender`] to push them through.

use crate::app::App;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parley_core::{Acknowledger, BoxError, DispatchError};
use serde_json::Value;
use std::sync::Arc;

/// One decoded inbound event, as delivered by the receiver.
pub struct IncomingEvent {
    /// The decoded payload. Read-only to the core.
    pub body: Value,
    /// The single-use acknowledgment capability for this event.
    pub ack: Acknowledger,
    /// Optional out-of-band respond capability (e.g. a response URL).
    pub respond: Option<Responder>,
}

impl IncomingEvent {
    /// An event with a discarding acknowledger and no responder.
    pub fn from_body(body: Value) -> Self {
        Self {
            body,
            ack: Acknowledger::discarding(),
            respond: None,
        }
    }
}

/// Out-of-band respond capability carried by some payloads.
#[derive(Clone)]
pub struct Responder {
    send: Arc<dyn Fn(Value) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>,
}

impl Responder {
    /// Wrap a receiver-supplied respond function.
    pub fn new<F>(send: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync + 'static,
    {
        Self {
            send: Arc::new(send),
        }
    }

    /// Send a response payload out of band.
    pub async fn respond(&self, payload: Value) -> Result<(), BoxError> {
        (self.send)(payload).await
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Responder")
    }
}

/// The handle a receiver pushes events and receiver-level errors through.
///
/// `send` drives one event's dispatch to completion; receivers that want
/// overlapping chains spawn one task per event around it.
#[derive(Clone)]
pub struct EventSender {
    app: App,
}

impl EventSender {
    pub(crate) fn new(app: App) -> Self {
        Self { app }
    }

    /// Dispatch one inbound event through the app.
    pub async fn send(&self, event: IncomingEvent) {
        self.app.dispatch(event).await;
    }

    /// Route a receiver-level error to the app's error sink.
    pub async fn report_error(&self, error: BoxError) {
        self.app.route_error(DispatchError::from_boxed(error)).await;
    }
}

/// The transport collaborator lifecycle.
///
/// `App::start` / `App::stop` forward to these verbatim and return the
/// receiver's result unchanged.
#[async_trait]
pub trait Receiver: Send + Sync {
    /// Start the transport, delivering events through `events`.
    async fn start(&self, events: EventSender) -> Result<(), BoxError>;

    /// Stop the transport.
    async fn stop(&self) -> Result<(), BoxError>;
}
