//! The acknowledgment gate.
//!
//! Every incoming event must be acknowledged at most once. The
//! [`Acknowledger`] wraps the receiver's send-side capability behind a
//! boolean latch: the first call forwards the response, every later call
//! fails with [`DispatchError::MultipleAcknowledgement`] without touching
//! the response that was already sent.
//!
//! If nothing ever acknowledges, that is not this gate's problem: the
//! send-side timeout belongs to the external receiver.

use crate::error::{BoxError, DispatchError};
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The receiver-supplied capability that actually sends the response.
pub type AckFn = Box<dyn Fn(Option<Value>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

struct AckInner {
    acked: AtomicBool,
    send: AckFn,
}

/// Single-use acknowledgment capability, shared across a chain.
///
/// Any middleware in the chain may acknowledge, not only the terminal one;
/// clones share the same latch.
#[derive(Clone)]
pub struct Acknowledger {
    inner: Arc<AckInner>,
}

impl Acknowledger {
    /// Wrap a receiver capability in the single-use gate.
    pub fn new(send: AckFn) -> Self {
        Self {
            inner: Arc::new(AckInner {
                acked: AtomicBool::new(false),
                send,
            }),
        }
    }

    /// An acknowledger that discards the response. Useful in tests and for
    /// receivers whose transport needs no reply.
    pub fn discarding() -> Self {
        Self::new(Box::new(|_| Box::pin(async { Ok(()) })))
    }

    /// Acknowledge the event, optionally with a response payload.
    ///
    /// At most once per event: the first call forwards to the receiver
    /// capability; every subsequent call returns
    /// [`DispatchError::MultipleAcknowledgement`] and leaves the original
    /// response untouched.
    pub async fn ack(&self, response: Option<Value>) -> Result<(), DispatchError> {
        if self.inner.acked.swap(true, Ordering::SeqCst) {
            return Err(DispatchError::MultipleAcknowledgement);
        }
        (self.inner.send)(response)
            .await
            .map_err(DispatchError::Unhandled)
    }

    /// Whether the event has been acknowledged.
    pub fn acknowledged(&self) -> bool {
        self.inner.acked.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Acknowledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acknowledger")
            .field("acknowledged", &self.acknowledged())
            .finish()
    }
}
