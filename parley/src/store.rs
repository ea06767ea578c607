//! Conversation state storage.
//!
//! Optional collaborator: when a store is configured and an event resolves
//! a conversation id, the context carries a [`ConversationHandle`] scoped
//! to that id. The store owns atomicity per key; the dispatcher adds no
//! locking of its own.

use async_trait::async_trait;
use parley_core::BoxError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Keyed conversation state, shared across all in-flight chains.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch the state for a conversation, if any.
    async fn get(&self, conversation_id: &str) -> Result<Option<Value>, BoxError>;

    /// Replace the state for a conversation.
    async fn set(&self, conversation_id: &str, state: Value) -> Result<(), BoxError>;
}

/// In-memory store. Suitable for tests and single-process apps.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, conversation_id: &str) -> Result<Option<Value>, BoxError> {
        Ok(self.entries.lock().unwrap().get(conversation_id).cloned())
    }

    async fn set(&self, conversation_id: &str, state: Value) -> Result<(), BoxError> {
        self.entries
            .lock()
            .unwrap()
            .insert(conversation_id.to_owned(), state);
        Ok(())
    }
}

/// Store accessors pre-bound to one event's conversation id.
#[derive(Clone)]
pub struct ConversationHandle {
    id: String,
    store: Arc<dyn ConversationStore>,
}

impl ConversationHandle {
    pub(crate) fn new(id: String, store: Arc<dyn ConversationStore>) -> Self {
        Self { id, store }
    }

    /// The conversation id this handle is bound to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch this conversation's state.
    pub async fn get(&self) -> Result<Option<Value>, BoxError> {
        self.store.get(&self.id).await
    }

    /// Replace this conversation's state.
    pub async fn set(&self, state: Value) -> Result<(), BoxError> {
        self.store.set(&self.id, state).await
    }
}

impl std::fmt::Debug for ConversationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationHandle")
            .field("id", &self.id)
            .finish()
    }
}
