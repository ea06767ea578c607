//! Testing utilities for Parley.
//!
//! Fakes for every injected collaborator, plus recording middleware and an
//! inspectable error sink, so dispatch behavior can be asserted without a
//! transport or a real API client.

use crate::client::{Authorization, Authorizer, AuthorizeQuery, ChatApi};
use crate::context::Context;
use crate::receiver::{EventSender, Receiver};
use crate::sink::ErrorHandler;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parley_core::{Acknowledger, BoxError, DispatchError, Middleware, Next};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// One message recorded by [`FakeChatApi`].
#[derive(Debug, Clone)]
pub struct PostedMessage {
    /// Target conversation.
    pub channel: String,
    /// The message payload as sent.
    pub payload: Value,
    /// The token the call was made with.
    pub token: Option<String>,
}

/// A [`ChatApi`] that records outbound calls instead of making them.
#[derive(Clone, Default)]
pub struct FakeChatApi {
    posts: Arc<Mutex<Vec<PostedMessage>>>,
    authorization: Authorization,
}

impl FakeChatApi {
    /// A fake with a default (empty) auth lookup result.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake whose auth lookup resolves to the given authorization.
    pub fn with_authorization(authorization: Authorization) -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            authorization,
        }
    }

    /// Everything posted so far.
    pub fn posts(&self) -> Vec<PostedMessage> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn post_message(
        &self,
        channel: &str,
        payload: Value,
        token: Option<&str>,
    ) -> Result<Value, BoxError> {
        self.posts.lock().unwrap().push(PostedMessage {
            channel: channel.to_owned(),
            payload,
            token: token.map(str::to_owned),
        });
        Ok(json!({ "ok": true }))
    }

    async fn auth_lookup(&self, _token: &str) -> Result<Authorization, BoxError> {
        Ok(self.authorization.clone())
    }
}

/// An [`Authorizer`] that always resolves to a fixed authorization.
pub struct StaticAuthorizer(pub Authorization);

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(&self, _query: &AuthorizeQuery) -> Result<Authorization, BoxError> {
        Ok(self.0.clone())
    }
}

/// An [`Authorizer`] that always fails.
pub struct FailingAuthorizer;

#[async_trait]
impl Authorizer for FailingAuthorizer {
    async fn authorize(&self, _query: &AuthorizeQuery) -> Result<Authorization, BoxError> {
        Err("no installation found".into())
    }
}

/// A middleware that records its label in a shared order log.
///
/// Proceeds by default; [`RecordingMiddleware::terminal`] builds one that
/// handles the event without proceeding.
pub struct RecordingMiddleware {
    label: String,
    order: Arc<Mutex<Vec<String>>>,
    proceed: bool,
}

impl RecordingMiddleware {
    /// A recorder that proceeds after logging.
    pub fn new(label: impl Into<String>, order: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label: label.into(),
            order,
            proceed: true,
        }
    }

    /// A recorder that stops the chain after logging.
    pub fn terminal(label: impl Into<String>, order: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label: label.into(),
            order,
            proceed: false,
        }
    }
}

impl Middleware<Context> for RecordingMiddleware {
    fn handle(&self, _ctx: Context, next: Next) -> BoxFuture<'static, Result<(), BoxError>> {
        let label = self.label.clone();
        let order = self.order.clone();
        let proceed = self.proceed;
        Box::pin(async move {
            order.lock().unwrap().push(label);
            if proceed {
                next.proceed()?;
            }
            Ok(())
        })
    }
}

/// An error sink that collects everything routed to it.
#[derive(Clone, Default)]
pub struct RecordingSink {
    errors: Arc<Mutex<Vec<DispatchError>>>,
}

impl RecordingSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of errors routed so far.
    pub fn len(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    /// Whether nothing was routed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<DispatchError> {
        std::mem::take(&mut *self.errors.lock().unwrap())
    }
}

impl ErrorHandler for RecordingSink {
    fn handle(&self, error: DispatchError) -> BoxFuture<'_, ()> {
        self.errors.lock().unwrap().push(error);
        Box::pin(async {})
    }
}

/// Build an [`Acknowledger`] plus a log of every response it forwarded.
pub fn ack_probe() -> (Acknowledger, Arc<Mutex<Vec<Option<Value>>>>) {
    let sent: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(Vec::new()));
    let record = sent.clone();
    let ack = Acknowledger::new(Box::new(move |response| {
        let record = record.clone();
        Box::pin(async move {
            record.lock().unwrap().push(response);
            Ok(())
        })
    }));
    (ack, sent)
}

/// A [`Receiver`] that records lifecycle calls and captures its sender.
///
/// Clones share state, so a test can keep one handle and hand the other to
/// the app builder.
#[derive(Clone, Default)]
pub struct FakeReceiver {
    started: Arc<Mutex<usize>>,
    stopped: Arc<Mutex<usize>>,
    sender: Arc<Mutex<Option<EventSender>>>,
}

impl FakeReceiver {
    /// A fresh fake receiver.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `start` was called.
    pub fn started(&self) -> usize {
        *self.started.lock().unwrap()
    }

    /// How many times `stop` was called.
    pub fn stopped(&self) -> usize {
        *self.stopped.lock().unwrap()
    }

    /// The sender captured on start, for pushing events in tests.
    pub fn sender(&self) -> Option<EventSender> {
        self.sender.lock().unwrap().clone()
    }
}

#[async_trait]
impl Receiver for FakeReceiver {
    async fn start(&self, events: EventSender) -> Result<(), BoxError> {
        *self.started.lock().unwrap() += 1;
        *self.sender.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        *self.stopped.lock().unwrap() += 1;
        Ok(())
    }
}
