//! The per-event argument bag.
//!
//! A [`Context`] is built by the enrichment pipeline once per event and
//! shared by every middleware in that event's chain. It is `Arc`-backed, so
//! clones are cheap handles onto the same bag; the bag is dropped when the
//! chain resolves.
//!
//! Optional members are present only when the event guarantees their
//! validity: `say` exists iff a conversation id was resolvable, the
//! conversation handle exists iff a store is configured as well. That
//! invariant is enforced at construction, not by convention.

use crate::client::{Authorization, ChatApi};
use crate::receiver::Responder;
use crate::say::Say;
use crate::store::ConversationHandle;
use parley_core::{Acknowledger, DispatchError, EventKind};
use serde_json::Value;
use std::sync::Arc;
use tracing::Span;

pub(crate) struct ContextInner {
    pub(crate) body: Value,
    pub(crate) kind: EventKind,
    pub(crate) authorization: Authorization,
    pub(crate) conversation_id: Option<String>,
    pub(crate) say: Option<Say>,
    pub(crate) ack: Acknowledger,
    pub(crate) respond: Option<Responder>,
    pub(crate) client: Arc<dyn ChatApi>,
    pub(crate) convo: Option<ConversationHandle>,
    pub(crate) span: Span,
}

/// Cheap handle onto one event's argument bag.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    pub(crate) fn new(inner: ContextInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The raw event payload, as received. Never mutated by the core.
    pub fn body(&self) -> &Value {
        &self.inner.body
    }

    /// The classified event kind.
    pub fn kind(&self) -> &EventKind {
        &self.inner.kind
    }

    /// The resolved authorization for this event.
    pub fn authorization(&self) -> &Authorization {
        &self.inner.authorization
    }

    /// The conversation id this event is associated with, if any.
    pub fn conversation_id(&self) -> Option<&str> {
        self.inner.conversation_id.as_deref()
    }

    /// The send-message capability, present iff a conversation id resolved.
    pub fn say(&self) -> Option<&Say> {
        self.inner.say.as_ref()
    }

    /// Acknowledge this event. At most once per event, from any middleware.
    pub async fn ack(&self, response: Option<Value>) -> Result<(), DispatchError> {
        self.inner.ack.ack(response).await
    }

    /// The underlying acknowledgment gate.
    pub fn acknowledger(&self) -> &Acknowledger {
        &self.inner.ack
    }

    /// The out-of-band respond capability, when the payload carried one.
    pub fn responder(&self) -> Option<&Responder> {
        self.inner.respond.as_ref()
    }

    /// The outbound API client, for calls beyond what `say` covers.
    pub fn client(&self) -> &Arc<dyn ChatApi> {
        &self.inner.client
    }

    /// Conversation-scoped state accessors, present iff a store is
    /// configured and a conversation id resolved.
    pub fn conversation(&self) -> Option<&ConversationHandle> {
        self.inner.convo.as_ref()
    }

    /// The tracing span covering this event's chain.
    pub fn span(&self) -> &Span {
        &self.inner.span
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("kind", &self.inner.kind)
            .field("conversation_id", &self.inner.conversation_id)
            .field("acknowledged", &self.inner.ack.acknowledged())
            .finish()
    }
}
