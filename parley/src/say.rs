//! The `say` capability.
//!
//! `say` is a send-message convenience bound to the conversation an event
//! was resolved to. It exists on the context only when a conversation id
//! was derivable from the payload; an event with no conversational context
//! simply has no `say`.

use crate::client::ChatApi;
use parley_core::BoxError;
use serde_json::{Value, json};
use std::sync::Arc;

/// Message forms accepted by [`Say::send`].
#[derive(Debug, Clone)]
pub enum SayMessage {
    /// Plain text, wrapped into a `{"text": ...}` payload.
    Text(String),
    /// A full message payload; the bound channel is merged in.
    Payload(Value),
}

impl From<&str> for SayMessage {
    fn from(text: &str) -> Self {
        SayMessage::Text(text.to_owned())
    }
}

impl From<String> for SayMessage {
    fn from(text: String) -> Self {
        SayMessage::Text(text)
    }
}

impl From<Value> for SayMessage {
    fn from(payload: Value) -> Self {
        SayMessage::Payload(payload)
    }
}

/// Send-message capability bound to one conversation and one token.
#[derive(Clone)]
pub struct Say {
    channel: String,
    token: Option<String>,
    client: Arc<dyn ChatApi>,
}

impl Say {
    pub(crate) fn new(channel: String, token: Option<String>, client: Arc<dyn ChatApi>) -> Self {
        Self {
            channel,
            token,
            client,
        }
    }

    /// The conversation this capability is bound to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Send a message to the bound conversation.
    pub async fn send(&self, message: impl Into<SayMessage>) -> Result<Value, BoxError> {
        let payload = match message.into() {
            SayMessage::Text(text) => json!({ "text": text }),
            SayMessage::Payload(mut payload) => {
                if let Some(object) = payload.as_object_mut() {
                    object
                        .entry("channel")
                        .or_insert_with(|| Value::String(self.channel.clone()));
                }
                payload
            }
        };
        self.client
            .post_message(&self.channel, payload, self.token.as_deref())
            .await
    }
}

impl std::fmt::Debug for Say {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Say").field("channel", &self.channel).finish()
    }
}
