//! Read-only probes over raw event payloads.
//!
//! Incoming bodies are untyped `serde_json` values decoded by the external
//! receiver. The core never mutates a payload; these helpers only read the
//! fields that classification and enrichment need.

use serde_json::Value;

/// Read a top-level string field.
pub fn str_at<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Read a nested string field by path.
pub fn str_path<'a>(body: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = body;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str()
}

/// A channel field may be a plain string or an object carrying an `id`.
fn channel_id_of(value: &Value) -> Option<&str> {
    value
        .as_str()
        .or_else(|| value.get("id").and_then(Value::as_str))
}

/// Derive the conversation id an event is contextually associated with.
///
/// Probe order, first present wins:
/// 1. `event.channel` (events)
/// 2. `event.item.channel` (reaction-style events)
/// 3. `channel_id` (commands)
/// 4. `channel.id` (actions and view payloads)
///
/// `None` means the event has no conversational context.
pub fn conversation_id(body: &Value) -> Option<String> {
    body.get("event")
        .and_then(|event| {
            event
                .get("channel")
                .and_then(channel_id_of)
                .or_else(|| str_path(event, &["item", "channel"]))
        })
        .or_else(|| str_at(body, "channel_id"))
        .or_else(|| str_path(body, &["channel", "id"]))
        .map(str::to_owned)
}

/// Resolve the action id carried by block-style payloads.
///
/// Block actions nest the id under `actions[0].action_id`; block suggestion
/// (options) payloads carry it at the top level.
pub fn action_id_of(body: &Value) -> Option<&str> {
    str_at(body, "action_id").or_else(|| {
        body.get("actions")
            .and_then(|actions| actions.get(0))
            .and_then(|action| str_at(action, "action_id"))
    })
}

/// Resolve the block id carried by block-style payloads.
pub fn block_id_of(body: &Value) -> Option<&str> {
    str_at(body, "block_id").or_else(|| {
        body.get("actions")
            .and_then(|actions| actions.get(0))
            .and_then(|action| str_at(action, "block_id"))
    })
}
